mod assign;
mod codes;
mod csv_out;
mod decode;
mod error;
mod grid;
mod interpret;
mod label;
mod merge;
mod model;
mod options;
mod page;
mod room;
mod text;
mod time;
mod warning;

use std::path::Path;

use crate::decode::select_pages;
use crate::page::{PageOutcome, process_page};
use crate::text::normalize_page;
use crate::warning::WarningCode;

pub use crate::codes::{ALL_BATCHES, ReviewReason, review_reasons};
pub use crate::csv_out::{write_schedules_csv, write_schedules_csv_to_string};
pub use crate::decode::{RawFragment, RawPage, decode_document};
pub use crate::error::ExtractError;
pub use crate::label::{classify_page, match_label};
pub use crate::merge::merge_schedules;
pub use crate::model::{
    Day, PageLabel, PageMapping, ScheduleExtraction, ScheduleRecord, TimeRange, TimeSlotDef, Token,
};
pub use crate::options::{ExtractOptions, LabMergePolicy, PageSelection};
pub use crate::room::room_id_from_header;
pub use crate::text::normalize_fragment;
pub use crate::time::{normalize_time, parse_time_range};
pub use crate::warning::{ExtractWarning, WarningCode as ExtractWarningCode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionReport {
    pub page_count: usize,
    pub record_count: usize,
    pub room_count: usize,
    pub warnings: Vec<ExtractWarning>,
}

/// Extracts and merges the weekly schedule of every selected page.
///
/// Page-local problems never abort the run; they are listed in the report.
///
/// # Errors
///
/// Fails on invalid options or when the page selection matches no page.
pub fn extract_schedules(
    pages: &[RawPage],
    options: &ExtractOptions,
) -> Result<(ScheduleExtraction, ExtractionReport), ExtractError> {
    options.validate()?;
    let selected = select_pages(pages, options.pages.as_ref())?;

    let outcome = selected
        .iter()
        .map(|page| process_page(page.page_number, &normalize_page(page), options))
        .fold(PageOutcome::default(), PageOutcome::combine);

    let schedules = merge_schedules(outcome.schedules);
    let mut warnings = outcome.warnings;
    if schedules.is_empty() {
        warnings.push(ExtractWarning::new(
            WarningCode::NoSchedulesExtracted,
            "no schedule records were extracted from the selected pages",
        ));
    }

    let report = ExtractionReport {
        page_count: selected.len(),
        record_count: schedules.len(),
        room_count: outcome.rooms.len(),
        warnings,
    };
    tracing::debug!(
        pages = report.page_count,
        records = report.record_count,
        rooms = report.room_count,
        "schedule extraction completed"
    );

    Ok((
        ScheduleExtraction {
            schedules,
            rooms: outcome.rooms,
        },
        report,
    ))
}

/// Labels every page of the document independently of schedule extraction.
#[must_use]
pub fn classify_pages(pages: &[RawPage]) -> PageMapping {
    let tokens = pages
        .iter()
        .map(|page| (page.page_number, normalize_page(page)))
        .collect::<Vec<_>>();
    label::classify_pages(
        tokens
            .iter()
            .map(|(page_number, tokens)| (*page_number, tokens.as_slice())),
    )
}

/// Decodes decoder JSON and extracts schedules in one step.
///
/// # Errors
///
/// Fails on malformed JSON, invalid options or an empty page selection.
pub fn extract_schedules_from_json(
    json: &str,
    options: &ExtractOptions,
) -> Result<(ScheduleExtraction, ExtractionReport), ExtractError> {
    let pages = decode_document(json)?;
    extract_schedules(&pages, options)
}

/// Reads decoder JSON from `input` and writes the merged schedule as CSV.
///
/// # Errors
///
/// Fails on I/O errors, malformed JSON or invalid options.
pub fn extract_file_to_csv(
    input: &Path,
    output_csv: &Path,
    options: &ExtractOptions,
) -> Result<ExtractionReport, ExtractError> {
    let json = std::fs::read_to_string(input)?;
    let (extraction, report) = extract_schedules_from_json(&json, options)?;
    write_schedules_csv(output_csv, &extraction.schedules, b',')?;
    Ok(report)
}
