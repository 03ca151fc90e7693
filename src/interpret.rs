use std::collections::HashSet;

use crate::assign::CellMap;
use crate::codes::{
    extract_batch, extract_course, extract_teacher, has_course_code, has_duration,
    has_lab_marker, is_bi_weekly, review_reasons,
};
use crate::grid::Grid;
use crate::model::{Cell, Day, ScheduleRecord, TimeRange, TimeSlotDef, Token};
use crate::options::{ExtractOptions, LabMergePolicy};
use crate::room::is_lab_room;

/// Why a cell was stretched over the following slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeReason {
    Duration,
    LabMarker,
    LabDefault,
    Overflow,
}

fn reading_order(cell: &Cell) -> Vec<&Token> {
    let mut tokens = cell.tokens.iter().collect::<Vec<_>>();
    tokens.sort_by(|left, right| left.y.total_cmp(&right.y).then(left.x.total_cmp(&right.x)));
    tokens
}

fn join_tokens(tokens: &[&Token]) -> String {
    tokens
        .iter()
        .map(|token| token.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn bottom_right(cell: &Cell) -> Option<&Token> {
    cell.tokens
        .iter()
        .max_by(|left, right| left.y.total_cmp(&right.y).then(left.x.total_cmp(&right.x)))
}

fn right_edge(token: &Token, glyph_width: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let chars = token.text.chars().count() as f64;
    token.x + chars * glyph_width
}

/// Text of the next slot's cell, joined in reading order.
struct Neighbour<'a> {
    slot: &'a TimeSlotDef,
    cell: Option<&'a Cell>,
    content: String,
}

impl Neighbour<'_> {
    /// The next cell holds only overflow from this one: a lab marker or text
    /// with no course of its own.
    fn is_continuation(&self) -> bool {
        self.cell.is_some() && (has_lab_marker(&self.content) || !has_course_code(&self.content))
    }
}

struct CellInterpreter<'a> {
    cells: &'a CellMap,
    grid: &'a Grid,
    room_id: &'a str,
    lab_room: bool,
    options: &'a ExtractOptions,
}

impl<'a> CellInterpreter<'a> {
    fn neighbour(&self, cell: &Cell) -> Option<Neighbour<'a>> {
        let slot = self.grid.slots.get(cell.slot_index + 1)?;
        let next = self.cells.get(&(cell.day, slot.start.clone()));
        let content = next
            .map(|next| join_tokens(&reading_order(next)))
            .unwrap_or_default();
        Some(Neighbour {
            slot,
            cell: next,
            content,
        })
    }

    fn merge_reason(
        &self,
        cell: &Cell,
        content: &str,
        neighbour: Option<&Neighbour<'_>>,
    ) -> Option<MergeReason> {
        let neighbour = neighbour?;

        if has_duration(content) {
            return Some(MergeReason::Duration);
        }
        if has_lab_marker(&neighbour.content) {
            return Some(MergeReason::LabMarker);
        }

        if self.lab_room {
            let default_merge = self.options.lab_policy == LabMergePolicy::AssumeDoubleSlot
                && (neighbour.content.is_empty() || neighbour.is_continuation());
            return default_merge.then_some(MergeReason::LabDefault);
        }

        let slot = &self.grid.slots[cell.slot_index];
        let threshold = slot.x + self.options.overflow_fraction * (neighbour.slot.x - slot.x);
        let rightmost = cell
            .tokens
            .iter()
            .map(|token| right_edge(token, self.options.glyph_width))
            .fold(f64::NEG_INFINITY, f64::max);
        (rightmost >= threshold).then_some(MergeReason::Overflow)
    }

    fn interpret(
        &self,
        cell: &Cell,
        consumed: &mut HashSet<(Day, String)>,
    ) -> Option<ScheduleRecord> {
        let content = join_tokens(&reading_order(cell));
        if content.chars().count() < self.options.min_content_chars {
            return None;
        }

        let slot = &self.grid.slots[cell.slot_index];
        let neighbour = self.neighbour(cell);
        let merge = self.merge_reason(cell, &content, neighbour.as_ref());

        let mut end = slot.end.clone();
        let mut spanned = None;
        let mut absorbed = None;
        if let (Some(reason), Some(neighbour)) = (merge, neighbour.as_ref()) {
            tracing::trace!(day = %cell.day, start = %slot.start, ?reason, "cell spans next slot");
            end.clone_from(&neighbour.slot.end);
            spanned = neighbour.cell;
            if neighbour.is_continuation() {
                consumed.insert((cell.day, neighbour.slot.start.clone()));
                absorbed = Some(neighbour.content.as_str());
            }
        }

        let course = extract_course(&content);

        let mut batch_candidates = Vec::with_capacity(3);
        // The batch of a spanning class is usually printed at the bottom right
        // of the last slot it covers.
        if let Some(token) = spanned.and_then(bottom_right) {
            batch_candidates.push(token.text.as_str());
        }
        if let Some(token) = bottom_right(cell) {
            batch_candidates.push(token.text.as_str());
        }
        batch_candidates.push(content.as_str());
        let batch = extract_batch(batch_candidates);

        let raw_content = match absorbed {
            Some(next_content) if !next_content.is_empty() => {
                format!("{content} {next_content}")
            }
            _ => content.clone(),
        };
        let teacher = extract_teacher(&raw_content);

        let reasons = review_reasons(&course, &batch);
        if !reasons.is_empty() {
            tracing::trace!(day = %cell.day, start = %slot.start, ?reasons, "record flagged for review");
        }

        Some(ScheduleRecord {
            room_number: self.room_id.to_string(),
            day: cell.day,
            time_slot: TimeRange {
                start: slot.start.clone(),
                end,
            },
            is_bi_weekly: is_bi_weekly(&content),
            needs_review: !reasons.is_empty(),
            course,
            batch,
            teacher,
            raw_content,
        })
    }
}

/// Turns the assigned cells of one page into schedule records.
///
/// Cells are visited day by day in slot order. A cell absorbed as the
/// continuation of its left neighbour produces no record of its own.
#[must_use]
pub fn interpret_cells(
    cells: &CellMap,
    grid: &Grid,
    room_id: &str,
    options: &ExtractOptions,
) -> Vec<ScheduleRecord> {
    let interpreter = CellInterpreter {
        cells,
        grid,
        room_id,
        lab_room: is_lab_room(room_id),
        options,
    };

    let mut consumed = HashSet::new();
    let mut records = Vec::new();
    for (key, cell) in cells {
        if consumed.contains(key) {
            continue;
        }
        if let Some(record) = interpreter.interpret(cell, &mut consumed) {
            records.push(record);
        }
    }
    records
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::interpret_cells;
    use crate::assign::assign_cells;
    use crate::grid::calibrate;
    use crate::model::{ScheduleRecord, Token};
    use crate::options::{ExtractOptions, LabMergePolicy};

    fn header(room: &str) -> Vec<Token> {
        vec![
            Token::new(2.0, 1.0, room),
            Token::new(1.0, 10.0, "Mon"),
            Token::new(5.0, 5.0, "8:00 - 9:15"),
            Token::new(20.0, 5.0, "9:15 - 10:30"),
            Token::new(35.0, 5.0, "10:30 - 11:45"),
        ]
    }

    fn run(room: &str, content: &[Token], options: &ExtractOptions) -> Vec<ScheduleRecord> {
        let mut tokens = header(room);
        tokens.extend_from_slice(content);
        let grid = calibrate(&tokens);
        let consumed = HashSet::from([0]);
        let assignment = assign_cells(&tokens, &grid, &consumed, options);
        let room_id = crate::room::room_id_from_header(room);
        interpret_cells(&assignment.cells, &grid, &room_id, options)
    }

    #[test]
    fn duration_keyword_extends_to_next_slot() {
        let records = run(
            "Room-205",
            &[Token::new(6.0, 11.0, "CSE 4510 100 mins C1S1")],
            &ExtractOptions::default(),
        );
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.room_number, "205");
        assert_eq!(record.time_slot.start, "08:00");
        assert_eq!(record.time_slot.end, "10:30");
        assert_eq!(record.course, "CSE 4510");
        assert_eq!(record.batch, "C1S1");
        assert!(!record.is_bi_weekly);
        assert!(!record.needs_review);
    }

    #[test]
    fn lab_marker_cell_is_absorbed_and_supplies_batch() {
        let records = run(
            "Room-205",
            &[
                Token::new(5.0, 10.5, "CSE 4512"),
                Token::new(19.0, 10.5, "L-2"),
                Token::new(21.0, 11.5, "C2S1"),
            ],
            &ExtractOptions::default(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].time_slot.end, "10:30");
        assert_eq!(records[0].batch, "C2S1");
        assert_eq!(records[0].raw_content, "CSE 4512 L-2 C2S1");
    }

    #[test]
    fn spanning_cell_reads_batch_from_next_slot_with_own_course() {
        let records = run(
            "Room-205",
            &[
                Token::new(6.0, 10.5, "CSE 4510 100 mins"),
                Token::new(20.0, 10.5, "CSE 4511"),
                Token::new(21.0, 11.5, "C1S1"),
            ],
            &ExtractOptions::default(),
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time_slot.end, "10:30");
        assert_eq!(records[0].course, "CSE 4510");
        assert_eq!(records[0].batch, "C1S1");
        assert_eq!(records[0].raw_content, "CSE 4510 100 mins");
        assert_eq!(records[1].course, "CSE 4511");
    }

    #[test]
    fn lab_room_defaults_to_two_slots_unless_next_has_course() {
        let options = ExtractOptions::default();
        let records = run("Lab-3", &[Token::new(5.0, 10.5, "CSE 4502 C1S2")], &options);
        assert_eq!(records[0].time_slot.end, "10:30");

        let records = run(
            "Lab-3",
            &[
                Token::new(5.0, 10.5, "CSE 4502 C1S2"),
                Token::new(20.0, 10.5, "EEE 4702 E2S1"),
            ],
            &options,
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].time_slot.end, "09:15");
        assert_eq!(records[1].time_slot.start, "09:15");
    }

    #[test]
    fn evidence_policy_keeps_lab_cells_single() {
        let options = ExtractOptions {
            lab_policy: LabMergePolicy::Evidence,
            ..ExtractOptions::default()
        };
        let records = run("Lab-3", &[Token::new(5.0, 10.5, "CSE 4502 C1S2")], &options);
        assert_eq!(records[0].time_slot.end, "09:15");
    }

    #[test]
    fn wide_content_overflows_into_next_column() {
        let options = ExtractOptions {
            glyph_width: 0.5,
            ..ExtractOptions::default()
        };
        let records = run(
            "Room-205",
            &[Token::new(5.0, 10.5, "Hum 4241 Engineering Ethics SW2")],
            &options,
        );
        assert_eq!(records[0].time_slot.end, "10:30");

        let records = run("Room-205", &[Token::new(5.0, 10.5, "Hum 4241 SW2")], &options);
        assert_eq!(records[0].time_slot.end, "09:15");
    }

    #[test]
    fn last_column_never_merges() {
        let records = run(
            "Room-205",
            &[Token::new(35.0, 10.5, "CSE 4510 100 mins C1S1")],
            &ExtractOptions::default(),
        );
        assert_eq!(records[0].time_slot.start, "10:30");
        assert_eq!(records[0].time_slot.end, "11:45");
    }

    #[test]
    fn noise_cells_are_not_emitted() {
        let records = run(
            "Room-205",
            &[Token::new(6.0, 10.5, "x"), Token::new(20.0, 10.5, "--")],
            &ExtractOptions::default(),
        );
        assert!(records.is_empty());
    }

    #[test]
    fn department_only_cell_needs_review() {
        let records = run(
            "Room-205",
            &[Token::new(6.0, 10.5, "ME 3S1")],
            &ExtractOptions::default(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].course, "");
        assert!(records[0].needs_review);
    }

    #[test]
    fn duplicated_course_is_bi_weekly() {
        let records = run(
            "Room-205",
            &[
                Token::new(6.0, 10.0, "CSE 4502 C1S1"),
                Token::new(6.0, 11.0, "CSE 4502 C1S2"),
            ],
            &ExtractOptions::default(),
        );
        assert!(records[0].is_bi_weekly);
        assert_eq!(records[0].batch, "C1S2");
    }
}
