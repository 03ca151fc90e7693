//! Pattern tables for reading cell content.
//!
//! Every cascade is an ordered table of `(kind, regex)` rules. Evaluation stops
//! at the first rule that matches, so the order of the tables is the priority
//! order.

use std::sync::LazyLock;

use regex::Regex;

/// Department abbreviations printed in front of course codes and batch names.
pub const DEPARTMENTS: &[&str] = &[
    "CSE", "SWE", "EEE", "MPE", "IPE", "CEE", "BTM", "TVE", "ME", "CE",
];

/// Batch value used when no cohort code can be read from a cell.
pub const ALL_BATCHES: &str = "All";

static COURSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[A-Za-z]{2,5}\s?\d{4}\b").expect("hardcoded course regex is valid")
});

static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d+\s*(?:minutes|mins|min)\b|\bmin\(s\)")
        .expect("hardcoded duration regex is valid")
});

static LAB_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bL-[1-6]\b").expect("hardcoded lab marker regex is valid"));

static TEACHER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((?P<initials>[A-Z]{2,5}(?:\s*[,/&]\s*[A-Z]{2,5})*)\)")
        .expect("hardcoded teacher regex is valid")
});

static TYPO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^CS([SB]\d)$").expect("hardcoded typo regex is valid"));

static DEPARTMENT_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?:{})\b", DEPARTMENTS.join("|")))
        .expect("department prefix regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchRuleKind {
    /// Program letter(s), year, section letter, group: `C1S1`, `C5B2`.
    ProgramYearSection,
    /// Department name with a year and optional section: `CSE-21`, `EEE 3A`.
    DepartmentYear,
    /// Year, section letter and optional group: `3S1`, `2A`.
    YearSection,
    /// Short program code with a year: `SW3`, `EE2`.
    ProgramYear,
    LetterDigit,
    Postgraduate,
}

struct BatchRule {
    kind: BatchRuleKind,
    pattern: Regex,
}

static BATCH_RULES: LazyLock<Vec<BatchRule>> = LazyLock::new(|| {
    let departments = DEPARTMENTS.join("|");
    [
        (
            BatchRuleKind::ProgramYearSection,
            r"\b(?:[A-Z]{1,3}\d[A-Z]|CS[SB])\d\b".to_string(),
        ),
        (
            BatchRuleKind::DepartmentYear,
            format!(r"\b(?:{departments})[\s-]?\d{{1,2}}[A-Z]?\b"),
        ),
        (BatchRuleKind::YearSection, r"\b\d[A-Z]\d?\b".to_string()),
        (BatchRuleKind::ProgramYear, r"\b[A-Z]{2,3}\d\b".to_string()),
        (BatchRuleKind::LetterDigit, r"\b[A-Z]\d\b".to_string()),
        (BatchRuleKind::Postgraduate, r"\b(?:MSc|PhD)\b".to_string()),
    ]
    .into_iter()
    .map(|(kind, pattern)| BatchRule {
        kind,
        pattern: Regex::new(&pattern).expect("hardcoded batch regex is valid"),
    })
    .collect()
});

/// A batch code read from cell text, with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchMatch {
    pub kind: BatchRuleKind,
    pub code: String,
}

fn correct_batch_typo(code: &str) -> String {
    TYPO_RE.replace(code, "C5${1}").into_owned()
}

/// Runs the batch rule table against `text`; the first rule that matches wins.
#[must_use]
pub fn match_batch(text: &str) -> Option<BatchMatch> {
    BATCH_RULES.iter().find_map(|rule| {
        rule.pattern.find(text).map(|found| BatchMatch {
            kind: rule.kind,
            code: correct_batch_typo(found.as_str()),
        })
    })
}

/// Tries each candidate text in order and falls back to [`ALL_BATCHES`].
#[must_use]
pub fn extract_batch<'a>(candidates: impl IntoIterator<Item = &'a str>) -> String {
    candidates
        .into_iter()
        .find_map(match_batch)
        .map_or_else(|| ALL_BATCHES.to_string(), |found| found.code)
}

#[must_use]
pub fn has_course_code(text: &str) -> bool {
    COURSE_RE.is_match(text)
}

#[must_use]
pub fn has_duration(text: &str) -> bool {
    DURATION_RE.is_match(text)
}

#[must_use]
pub fn has_lab_marker(text: &str) -> bool {
    LAB_MARKER_RE.is_match(text)
}

/// A cell printed twice with the same course code alternates weeks.
#[must_use]
pub fn is_bi_weekly(text: &str) -> bool {
    let codes = COURSE_RE
        .find_iter(text)
        .map(|found| {
            found
                .as_str()
                .split_whitespace()
                .collect::<String>()
                .to_ascii_uppercase()
        })
        .take(2)
        .collect::<Vec<_>>();
    codes.len() == 2 && codes[0] == codes[1]
}

fn strip_leading_departments(text: &str) -> String {
    let mut words = text.split_whitespace().peekable();
    while words.next_if(|word| DEPARTMENTS.contains(word)).is_some() {}
    words.collect::<Vec<_>>().join(" ")
}

/// Course code when present, otherwise whatever free text is left after the
/// batch codes, durations, lab markers, teacher initials and leading
/// department names are removed.
#[must_use]
pub fn extract_course(content: &str) -> String {
    if let Some(found) = COURSE_RE.find(content) {
        return found.as_str().to_string();
    }

    let mut remainder = content.to_string();
    for pattern in BATCH_RULES
        .iter()
        .map(|rule| &rule.pattern)
        .chain([&*DURATION_RE, &*LAB_MARKER_RE, &*TEACHER_RE])
    {
        remainder = pattern.replace_all(&remainder, " ").into_owned();
    }

    let course = strip_leading_departments(&remainder);
    if course.chars().count() > 2 {
        course
    } else {
        String::new()
    }
}

/// Teacher initials printed in parentheses, e.g. `(MHK)` or `(MHK/ARF)`.
#[must_use]
pub fn extract_teacher(content: &str) -> String {
    TEACHER_RE
        .captures_iter(content)
        .flat_map(|captures| {
            captures["initials"]
                .split([',', '/', '&'])
                .map(|initials| initials.trim().to_string())
                .collect::<Vec<_>>()
        })
        .filter(|initials| !initials.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewReason {
    UnresolvedBatch,
    ShortCourse,
    SymbolOnlyCourse,
    /// A department name sits where the course code should be, which usually
    /// means the fragment belongs to a neighbouring cell.
    DepartmentAsCourse,
}

/// Every reason a record should be checked by a person; empty when confident.
#[must_use]
pub fn review_reasons(course: &str, batch: &str) -> Vec<ReviewReason> {
    let mut reasons = Vec::new();
    if batch == ALL_BATCHES {
        reasons.push(ReviewReason::UnresolvedBatch);
    }
    if course.chars().count() < 3 {
        reasons.push(ReviewReason::ShortCourse);
    }
    if !course.is_empty() && !course.chars().any(char::is_alphanumeric) {
        reasons.push(ReviewReason::SymbolOnlyCourse);
    }
    if DEPARTMENT_PREFIX_RE.is_match(course) && !COURSE_RE.is_match(course) {
        reasons.push(ReviewReason::DepartmentAsCourse);
    }
    reasons
}
