use crate::model::{Day, TimeSlotDef, Token};
use crate::time::{is_canonical, parse_time_range};

/// Row anchors and slot columns discovered on one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grid {
    /// `(day, y)` in weekday order; days without a label are absent.
    pub day_rows: Vec<(Day, f64)>,
    /// Slot columns in strictly increasing `x`.
    pub slots: Vec<TimeSlotDef>,
}

pub(crate) fn is_day_label(text: &str) -> bool {
    Day::from_short_label(text).is_some()
}

fn day_rows(tokens: &[Token]) -> Vec<(Day, f64)> {
    Day::ALL
        .into_iter()
        .filter_map(|day| {
            tokens
                .iter()
                .find(|token| token.text == day.short_label())
                .map(|token| (day, token.y))
        })
        .collect()
}

fn time_slots(tokens: &[Token]) -> Vec<TimeSlotDef> {
    let mut candidates = tokens
        .iter()
        .filter_map(|token| {
            let (start, end) = parse_time_range(&token.text)?;
            Some(TimeSlotDef {
                x: token.x,
                start,
                end,
                raw: token.text.clone(),
            })
        })
        .collect::<Vec<_>>();
    candidates.sort_by(|left, right| left.x.total_cmp(&right.x));

    let mut slots: Vec<TimeSlotDef> = Vec::with_capacity(candidates.len());
    for slot in candidates {
        if !is_canonical(&slot.start) || !is_canonical(&slot.end) || slot.start >= slot.end {
            tracing::debug!(raw = %slot.raw, "dropping unusable time slot header");
            continue;
        }
        if slots.last().is_some_and(|previous| previous.x >= slot.x) {
            tracing::debug!(raw = %slot.raw, x = slot.x, "dropping slot header sharing a column");
            continue;
        }
        slots.push(slot);
    }
    slots
}

/// Locates day rows and time-slot columns.
#[must_use]
pub fn calibrate(tokens: &[Token]) -> Grid {
    Grid {
        day_rows: day_rows(tokens),
        slots: time_slots(tokens),
    }
}

pub(crate) fn is_slot_header(text: &str) -> bool {
    parse_time_range(text).is_some()
}
