use std::collections::{BTreeMap, HashSet};

use crate::grid::{Grid, is_day_label, is_slot_header};
use crate::model::{Cell, Day, Token};
use crate::options::ExtractOptions;

/// Cells keyed by `(day, slot start)`; iteration runs day by day, earliest slot first.
pub type CellMap = BTreeMap<(Day, String), Cell>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellAssignment {
    pub cells: CellMap,
    /// Tokens that matched no day row or lay too far from every slot column.
    pub dropped: usize,
}

fn match_day(token: &Token, grid: &Grid, y_tolerance: f64) -> Option<Day> {
    grid.day_rows
        .iter()
        .find(|(_, anchor)| (token.y - anchor).abs() < y_tolerance)
        .map(|(day, _)| *day)
}

fn nearest_slot(token: &Token, grid: &Grid, noise_threshold: f64) -> Option<usize> {
    let (index, distance) = grid
        .slots
        .iter()
        .enumerate()
        .map(|(index, slot)| (index, (token.x - slot.x).abs()))
        .min_by(|left, right| left.1.total_cmp(&right.1))?;

    (distance <= noise_threshold).then_some(index)
}

/// Buckets every content token into the cell of its day row and nearest slot.
///
/// Tokens listed in `consumed` (the room header) and every day label or slot
/// header are skipped.
#[must_use]
pub fn assign_cells(
    tokens: &[Token],
    grid: &Grid,
    consumed: &HashSet<usize>,
    options: &ExtractOptions,
) -> CellAssignment {
    let mut assignment = CellAssignment::default();

    for (index, token) in tokens.iter().enumerate() {
        if consumed.contains(&index) || is_day_label(&token.text) || is_slot_header(&token.text) {
            continue;
        }

        let Some(day) = match_day(token, grid, options.y_tolerance) else {
            assignment.dropped += 1;
            continue;
        };
        let Some(slot_index) = nearest_slot(token, grid, options.slot_noise_threshold) else {
            assignment.dropped += 1;
            continue;
        };

        let start = grid.slots[slot_index].start.clone();
        assignment
            .cells
            .entry((day, start))
            .or_insert_with(|| Cell {
                day,
                slot_index,
                tokens: Vec::new(),
            })
            .tokens
            .push(token.clone());
    }

    assignment
}
