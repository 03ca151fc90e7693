use std::io;
use std::path::Path;

use csv::{Writer, WriterBuilder};

use crate::error::ExtractError;
use crate::model::ScheduleRecord;

const HEADERS: [&str; 10] = [
    "room",
    "day",
    "start",
    "end",
    "course",
    "batch",
    "teacher",
    "bi_weekly",
    "needs_review",
    "raw_content",
];

fn write_records<W: io::Write>(
    writer: &mut Writer<W>,
    records: &[ScheduleRecord],
) -> Result<(), ExtractError> {
    writer.write_record(HEADERS)?;
    for record in records {
        writer.write_record([
            record.room_number.as_str(),
            record.day.name(),
            record.time_slot.start.as_str(),
            record.time_slot.end.as_str(),
            record.course.as_str(),
            record.batch.as_str(),
            record.teacher.as_str(),
            if record.is_bi_weekly { "true" } else { "false" },
            if record.needs_review { "true" } else { "false" },
            record.raw_content.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// # Errors
///
/// Fails when the file cannot be created or written.
pub fn write_schedules_csv(
    path: &Path,
    records: &[ScheduleRecord],
    delimiter: u8,
) -> Result<(), ExtractError> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_path(path)?;
    write_records(&mut writer, records)
}

/// # Errors
///
/// Fails only if the CSV writer rejects a record.
pub fn write_schedules_csv_to_string(
    records: &[ScheduleRecord],
    delimiter: u8,
) -> Result<String, ExtractError> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::<u8>::new());
    write_records(&mut writer, records)?;

    let bytes = writer
        .into_inner()
        .map_err(|error| ExtractError::Csv(error.into_error().into()))?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::Io(io::Error::new(io::ErrorKind::InvalidData, error)))
}
