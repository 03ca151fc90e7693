use crate::model::ScheduleRecord;

fn continues(last: &ScheduleRecord, current: &ScheduleRecord) -> bool {
    if last.room_number != current.room_number
        || last.day != current.day
        || last.time_slot.end != current.time_slot.start
    {
        return false;
    }

    let same_course = !last.course.is_empty() && last.course == current.course;
    let fragment = !last.course.is_empty() && current.course.is_empty();
    same_course || fragment
}

/// Joins records that describe one class split across adjacent slots.
///
/// Runs over the whole document at once: records are ordered by weekday, room
/// and start time, then each record is folded into the previously emitted one
/// when it starts exactly where that one ends and either repeats its course or
/// carries no course at all.
#[must_use]
pub fn merge_schedules(mut records: Vec<ScheduleRecord>) -> Vec<ScheduleRecord> {
    records.sort_by(|left, right| {
        left.day
            .cmp(&right.day)
            .then_with(|| left.room_number.cmp(&right.room_number))
            .then_with(|| left.time_slot.start.cmp(&right.time_slot.start))
    });

    let mut merged: Vec<ScheduleRecord> = Vec::with_capacity(records.len());
    for current in records {
        match merged.last_mut() {
            Some(last) if continues(last, &current) => {
                last.time_slot.end = current.time_slot.end;
                if last.course.is_empty() {
                    last.course = current.course;
                }
                last.raw_content.push_str(" / ");
                last.raw_content.push_str(&current.raw_content);
            }
            _ => merged.push(current),
        }
    }
    merged
}
