//! Clock-time normalization for slot headers.
//!
//! Timetable headers print times without a meridiem most of the time. Classes
//! never start before 8:00 and never run past midnight, so an hour of 1 to 7
//! without `AM`/`PM` is read as afternoon. A genuine early-morning time such as
//! `6:30` without a marker is therefore misread as `18:30`; there is no way to
//! tell the two apart from the header alone.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*([AP]\.?M\.?)?")
        .expect("hardcoded time regex is valid")
});

static TIME_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(?P<start>\d{1,2}:\d{2}(?:\s*[AP]\.?M\.?)?)\s*[-–—]\s*(?P<end>\d{1,2}:\d{2}(?:\s*[AP]\.?M\.?)?)\s*$",
    )
    .expect("hardcoded time range regex is valid")
});

fn to_24_hour(hour: u32, meridiem: Option<&str>) -> u32 {
    match meridiem.map(|value| value.to_ascii_uppercase().starts_with('P')) {
        Some(true) if hour != 12 => hour + 12,
        Some(false) if hour == 12 => 0,
        Some(_) => hour,
        None if (1..=7).contains(&hour) => hour + 12,
        None => hour,
    }
}

/// Converts the first time found in `input` to a zero-padded 24-hour `HH:MM`.
///
/// Returns `input` unchanged when it holds no recognizable time.
#[must_use]
pub fn normalize_time(input: &str) -> String {
    let Some(captures) = TIME_RE.captures(input) else {
        return input.to_string();
    };

    let hour = captures[1].parse::<u32>().ok();
    let minute = captures[2].parse::<u32>().ok();
    let meridiem = captures.get(3).map(|value| value.as_str());

    hour.zip(minute)
        .and_then(|(hour, minute)| NaiveTime::from_hms_opt(to_24_hour(hour, meridiem), minute, 0))
        .map_or_else(
            || input.to_string(),
            |time| time.format("%H:%M").to_string(),
        )
}

/// Parses a `start - end` header into normalized `(start, end)` times.
#[must_use]
pub fn parse_time_range(input: &str) -> Option<(String, String)> {
    let captures = TIME_RANGE_RE.captures(input)?;
    Some((
        normalize_time(&captures["start"]),
        normalize_time(&captures["end"]),
    ))
}

/// `true` when `value` is already a canonical `HH:MM` string.
pub(crate) fn is_canonical(value: &str) -> bool {
    value.len() == 5 && NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}
