use std::collections::{BTreeSet, HashSet};

use crate::assign::assign_cells;
use crate::grid::calibrate;
use crate::interpret::interpret_cells;
use crate::model::{ScheduleRecord, Token};
use crate::options::ExtractOptions;
use crate::room::detect_room_header;
use crate::warning::{ExtractWarning, WarningCode};

/// Everything one page contributes; pages never share state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageOutcome {
    pub schedules: Vec<ScheduleRecord>,
    pub rooms: BTreeSet<String>,
    pub warnings: Vec<ExtractWarning>,
}

impl PageOutcome {
    fn skipped(warning: ExtractWarning) -> Self {
        Self {
            warnings: vec![warning],
            ..Self::default()
        }
    }

    /// Folds another page's outcome into this one.
    #[must_use]
    pub fn combine(mut self, other: Self) -> Self {
        self.schedules.extend(other.schedules);
        self.rooms.extend(other.rooms);
        self.warnings.extend(other.warnings);
        self
    }
}

/// Runs room detection, calibration, assignment and interpretation on one page.
#[must_use]
pub fn process_page(page_number: u32, tokens: &[Token], options: &ExtractOptions) -> PageOutcome {
    let Some(header) = detect_room_header(tokens) else {
        tracing::debug!(page = page_number, "no room header, skipping page");
        return PageOutcome::skipped(
            ExtractWarning::new(WarningCode::NoRoomHeader, "page has no Room-/Lab- header")
                .with_page(page_number),
        );
    };

    let grid = calibrate(tokens);
    let mut warnings = Vec::new();
    if grid.day_rows.is_empty() {
        warnings.push(
            ExtractWarning::new(WarningCode::NoDayAnchors, "no day labels found on page")
                .with_page(page_number),
        );
    }
    if grid.slots.is_empty() {
        warnings.push(
            ExtractWarning::new(WarningCode::NoTimeSlots, "no time slot headers found on page")
                .with_page(page_number),
        );
    }

    let consumed = HashSet::from([header.token_index]);
    let assignment = assign_cells(tokens, &grid, &consumed, options);
    if assignment.dropped > 0 && !grid.day_rows.is_empty() && !grid.slots.is_empty() {
        warnings.push(
            ExtractWarning::new(
                WarningCode::NoiseDropped,
                "tokens outside every day row or slot column were ignored",
            )
            .with_page(page_number)
            .with_dropped_tokens(assignment.dropped),
        );
    }

    let schedules = interpret_cells(&assignment.cells, &grid, &header.room_id, options);
    tracing::debug!(
        page = page_number,
        room = %header.room_id,
        days = grid.day_rows.len(),
        slots = grid.slots.len(),
        cells = assignment.cells.len(),
        records = schedules.len(),
        "page processed"
    );

    PageOutcome {
        schedules,
        rooms: BTreeSet::from([header.room_id]),
        warnings,
    }
}
