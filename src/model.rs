use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

/// A decoded text fragment positioned on one page.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

impl Token {
    #[must_use]
    pub fn new(x: f64, y: f64, text: impl Into<String>) -> Self {
        Self {
            x,
            y,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Weekday order used for row lookup and for sorting merged output.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    #[must_use]
    pub const fn short_label(self) -> &'static str {
        match self {
            Self::Monday => "Mon",
            Self::Tuesday => "Tue",
            Self::Wednesday => "Wed",
            Self::Thursday => "Thu",
            Self::Friday => "Fri",
            Self::Saturday => "Sat",
            Self::Sunday => "Sun",
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
            Self::Sunday => "Sunday",
        }
    }

    #[must_use]
    pub fn from_short_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|day| day.short_label() == label)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One time-slot column discovered from a header such as `8:00 - 9:15`.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlotDef {
    pub x: f64,
    pub start: String,
    pub end: String,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub day: Day,
    pub slot_index: usize,
    pub tokens: Vec<Token>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRecord {
    pub room_number: String,
    pub day: Day,
    pub time_slot: TimeRange,
    pub course: String,
    pub batch: String,
    pub teacher: String,
    pub is_bi_weekly: bool,
    pub needs_review: bool,
    pub raw_content: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScheduleExtraction {
    pub schedules: Vec<ScheduleRecord>,
    pub rooms: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageLabel {
    pub page_number: u32,
    pub batch: Option<String>,
    pub section: Option<String>,
    pub semester: Option<String>,
    pub full_text: String,
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMapping {
    pub total_pages: usize,
    pub page_mapping: Vec<PageLabel>,
}
