//! Page labels such as `BSc CSE 3rd-Section 2`, read from a page's header.
//!
//! The label is searched in widening windows, from the top-left corner to the
//! whole page. Within a window, rules are tried from the most specific shape to
//! the most generic one. The first window that yields any match decides the
//! label, so a generic phrase deep in the page never beats a precise header.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::model::{PageLabel, PageMapping, Token};

const FIRST_TOKENS_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRuleKind {
    PostgraduateDepartment,
    MscDepartment,
    BscOrdinalSection,
    BscSemesterSection,
    BscYear,
    BscOrdinalLetter,
    BscDepartment,
    SemesterSection,
    Year,
}

struct LabelRule {
    kind: LabelRuleKind,
    pattern: Regex,
}

static LABEL_RULES: LazyLock<Vec<LabelRule>> = LazyLock::new(|| {
    const ORD: &str = r"(?P<ordinal>\d+(?:st|nd|rd|th))";
    const DEPT: &str = r"(?:in\s+)?(?P<dept>[A-Z]{2,4})";
    const SECTION: &str = r"Section\s*-?\s*(?P<section>[A-Za-z0-9]+)";

    [
        (
            LabelRuleKind::PostgraduateDepartment,
            format!(r"\b(?P<program>MSc\s*/\s*PhD|PhD\s*/\s*MSc)\s+{DEPT}\b"),
        ),
        (
            LabelRuleKind::MscDepartment,
            format!(r"\b(?P<program>MSc)\s+{DEPT}\b"),
        ),
        (
            LabelRuleKind::BscOrdinalSection,
            format!(r"\b(?P<program>BSc)\s+{DEPT}\s+{ORD}\s*-\s*{SECTION}"),
        ),
        (
            LabelRuleKind::BscSemesterSection,
            format!(r"\b(?P<program>BSc)\s+{DEPT}\s*,?\s+{ORD}\s+Sem(?:ester)?\s*,?\s*{SECTION}"),
        ),
        (
            LabelRuleKind::BscYear,
            format!(r"\b(?P<program>BSc)\s+{DEPT}\s*,?\s+{ORD}\s+Year(?:\s*,?\s*{SECTION})?"),
        ),
        (
            LabelRuleKind::BscOrdinalLetter,
            format!(r"\b(?P<program>BSc)\s+{DEPT}\s+{ORD}\s*\(?(?P<section>[A-Z])\)?(?:\s|$)"),
        ),
        (
            LabelRuleKind::BscDepartment,
            format!(r"\b(?P<program>BSc)\s+{DEPT}\b"),
        ),
        (
            LabelRuleKind::SemesterSection,
            format!(r"\b{ORD}\s+Sem(?:ester)?\s*,?\s*{SECTION}"),
        ),
        (
            LabelRuleKind::Year,
            format!(r"\b{ORD}\s+Year(?:\s*,?\s*{SECTION})?"),
        ),
    ]
    .into_iter()
    .map(|(kind, pattern)| LabelRule {
        kind,
        pattern: Regex::new(&pattern).expect("hardcoded label regex is valid"),
    })
    .collect()
});

/// A label rule hit inside one window of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMatch {
    pub kind: LabelRuleKind,
    pub batch: Option<String>,
    pub section: Option<String>,
    pub semester: Option<String>,
    pub full_text: String,
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn from_captures(kind: LabelRuleKind, captures: &Captures<'_>) -> LabelMatch {
    let group = |name: &str| captures.name(name).map(|value| collapse_whitespace(value.as_str()));
    let batch = match (group("program"), group("dept")) {
        (Some(program), Some(dept)) => Some(format!("{program} {dept}")),
        (program, dept) => program.or(dept),
    };

    LabelMatch {
        kind,
        batch,
        section: group("section"),
        semester: group("ordinal"),
        full_text: collapse_whitespace(&captures[0]),
    }
}

/// Runs the label rule table over one window; the first matching rule wins.
#[must_use]
pub fn match_label(text: &str) -> Option<LabelMatch> {
    LABEL_RULES.iter().find_map(|rule| {
        rule.pattern
            .captures(text)
            .map(|captures| from_captures(rule.kind, &captures))
    })
}

fn reading_order(tokens: &[Token]) -> Vec<&Token> {
    let mut ordered = tokens.iter().collect::<Vec<_>>();
    ordered.sort_by(|left, right| left.y.total_cmp(&right.y).then(left.x.total_cmp(&right.x)));
    ordered
}

fn join(tokens: &[&Token]) -> String {
    tokens
        .iter()
        .map(|token| token.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Candidate header texts, narrowest first.
fn windows(tokens: &[Token]) -> [String; 4] {
    let ordered = reading_order(tokens);
    let within = |max_y: f64, max_x: f64| {
        ordered
            .iter()
            .copied()
            .filter(|token| token.y < max_y && token.x < max_x)
            .collect::<Vec<_>>()
    };

    [
        join(&within(3.0, 15.0)),
        join(&within(5.0, 20.0)),
        join(&ordered[..ordered.len().min(FIRST_TOKENS_WINDOW)]),
        join(&ordered),
    ]
}

/// Extracts the batch/section/semester label of one page.
#[must_use]
pub fn classify_page(page_number: u32, tokens: &[Token]) -> PageLabel {
    let windows = windows(tokens);
    let found = windows
        .iter()
        .find_map(|window| match_label(window).map(|found| (found, window)));

    match found {
        Some((found, window)) => {
            tracing::debug!(page = page_number, kind = ?found.kind, label = %found.full_text, "page label");
            PageLabel {
                page_number,
                batch: found.batch,
                section: found.section,
                semester: found.semester,
                full_text: found.full_text,
                raw_text: window.clone(),
            }
        }
        None => PageLabel {
            page_number,
            batch: None,
            section: None,
            semester: None,
            full_text: format!("Page {page_number}"),
            raw_text: windows[3].clone(),
        },
    }
}

/// Labels every page; pages are numbered from 1 in the order given.
#[must_use]
pub fn classify_pages<'a>(pages: impl IntoIterator<Item = (u32, &'a [Token])>) -> PageMapping {
    let page_mapping = pages
        .into_iter()
        .map(|(page_number, tokens)| classify_page(page_number, tokens))
        .collect::<Vec<_>>();
    PageMapping {
        total_pages: page_mapping.len(),
        page_mapping,
    }
}

#[cfg(test)]
mod tests {
    use super::{LabelRuleKind, classify_page, match_label};
    use crate::model::Token;

    #[test]
    fn most_specific_bsc_shape_wins() {
        let found = match_label("Class Routine BSc CSE 3rd-Section 2 Summer").expect("label");
        assert_eq!(found.kind, LabelRuleKind::BscOrdinalSection);
        assert_eq!(found.full_text, "BSc CSE 3rd-Section 2");
        assert_eq!(found.batch.as_deref(), Some("BSc CSE"));
        assert_eq!(found.semester.as_deref(), Some("3rd"));
        assert_eq!(found.section.as_deref(), Some("2"));
    }

    #[test]
    fn postgraduate_labels_come_first() {
        let found = match_label("MSc/PhD CSE BSc CSE 1st Year").expect("label");
        assert_eq!(found.kind, LabelRuleKind::PostgraduateDepartment);
        assert_eq!(found.batch.as_deref(), Some("MSc/PhD CSE"));

        let found = match_label("MSc in EEE").expect("label");
        assert_eq!(found.kind, LabelRuleKind::MscDepartment);
        assert_eq!(found.batch.as_deref(), Some("MSc EEE"));
    }

    #[test]
    fn bsc_variants() {
        let found = match_label("BSc SWE 2nd Semester Section A").expect("label");
        assert_eq!(found.kind, LabelRuleKind::BscSemesterSection);
        assert_eq!(found.section.as_deref(), Some("A"));

        let found = match_label("BSc EEE, 4th Year").expect("label");
        assert_eq!(found.kind, LabelRuleKind::BscYear);
        assert_eq!(found.section, None);

        let found = match_label("BSc ME 1st (B)").expect("label");
        assert_eq!(found.kind, LabelRuleKind::BscOrdinalLetter);
        assert_eq!(found.section.as_deref(), Some("B"));

        let found = match_label("BSc CEE").expect("label");
        assert_eq!(found.kind, LabelRuleKind::BscDepartment);
        assert_eq!(found.full_text, "BSc CEE");
    }

    #[test]
    fn bare_ordinal_labels() {
        let found = match_label("5th Semester Section 1").expect("label");
        assert_eq!(found.kind, LabelRuleKind::SemesterSection);
        assert_eq!(found.batch, None);

        let found = match_label("2nd Year, Section B").expect("label");
        assert_eq!(found.kind, LabelRuleKind::Year);
        assert_eq!(found.section.as_deref(), Some("B"));
    }

    #[test]
    fn narrow_window_beats_a_more_specific_label_lower_down() {
        let tokens = vec![
            Token::new(2.0, 1.0, "1st Year"),
            Token::new(2.0, 30.0, "BSc CSE 3rd-Section 2"),
        ];
        let label = classify_page(1, &tokens);
        assert_eq!(label.full_text, "1st Year");
        assert_eq!(label.raw_text, "1st Year");
    }

    #[test]
    fn unmatched_page_gets_synthetic_label() {
        let tokens = vec![Token::new(2.0, 1.0, "Room-205"), Token::new(1.0, 10.0, "Mon")];
        let label = classify_page(4, &tokens);
        assert_eq!(label.full_text, "Page 4");
        assert_eq!(label.batch, None);
        assert_eq!(label.raw_text, "Room-205 Mon");
    }
}
