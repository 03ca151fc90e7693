use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::ExtractError;

/// How a lab room treats the slot that follows a class.
///
/// Lab sessions in the supported timetables usually occupy two consecutive
/// slots, but the second half is often printed empty or with only an `L-n`
/// marker. `AssumeDoubleSlot` merges unless the next slot clearly holds another
/// course; `Evidence` only merges on the same signals used for ordinary rooms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabMergePolicy {
    #[default]
    AssumeDoubleSlot,
    Evidence,
}

impl FromStr for LabMergePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "double-slot" | "double_slot" | "assume-double-slot" => Ok(Self::AssumeDoubleSlot),
            "evidence" => Ok(Self::Evidence),
            other => Err(format!(
                "unknown lab policy '{other}', expected 'double-slot' or 'evidence'"
            )),
        }
    }
}

/// 1-based page numbers selected with a spec like `1-3,5`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSelection {
    pages: BTreeSet<u32>,
}

impl PageSelection {
    #[must_use]
    pub fn contains(&self, page: u32) -> bool {
        self.pages.contains(&page)
    }
}

fn parse_page_number(value: &str, what: &str) -> Result<u32, String> {
    let page: u32 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid {what}: '{}'", value.trim()))?;
    if page == 0 {
        return Err("pages are 1-based".to_string());
    }
    Ok(page)
}

fn parse_selection(spec: &str) -> Result<BTreeSet<u32>, String> {
    let mut pages = BTreeSet::new();
    for part in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match part.split_once('-') {
            Some((first, last)) => {
                let first = parse_page_number(first, "page range start")?;
                let last = parse_page_number(last, "page range end")?;
                if last < first {
                    return Err(format!("invalid range '{part}': end is before start"));
                }
                pages.extend(first..=last);
            }
            None => {
                pages.insert(parse_page_number(part, "page number")?);
            }
        }
    }

    if pages.is_empty() {
        return Err("page selection cannot be empty".to_string());
    }

    Ok(pages)
}

impl FromStr for PageSelection {
    type Err = ExtractError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let pages = parse_selection(spec).map_err(ExtractError::InvalidPageSelection)?;
        Ok(Self { pages })
    }
}

/// Tolerances are expressed in the decoder's native coordinate units and must
/// be rescaled together when the decoder changes.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    pub pages: Option<PageSelection>,
    /// Maximum vertical distance between a token and its day row anchor.
    pub y_tolerance: f64,
    /// Tokens further than this from every slot header are dropped.
    pub slot_noise_threshold: f64,
    /// Share of the column gap a cell's text must reach to spill into the next slot.
    pub overflow_fraction: f64,
    /// Approximate advance of one character, used to estimate a token's right edge.
    pub glyph_width: f64,
    pub lab_policy: LabMergePolicy,
    /// Cells whose joined content is shorter than this are treated as noise.
    pub min_content_chars: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            pages: None,
            y_tolerance: 2.0,
            slot_noise_threshold: 10.0,
            overflow_fraction: 0.6,
            glyph_width: 0.3,
            lab_policy: LabMergePolicy::AssumeDoubleSlot,
            min_content_chars: 3,
        }
    }
}

impl ExtractOptions {
    /// # Errors
    ///
    /// Returns [`ExtractError::InvalidOption`] when a tolerance is not a
    /// positive finite number or the overflow fraction is outside `(0, 1]`.
    pub fn validate(&self) -> Result<(), ExtractError> {
        if !(self.y_tolerance.is_finite() && self.y_tolerance > 0.0) {
            return Err(ExtractError::InvalidOption(format!(
                "y_tolerance must be positive, got {}",
                self.y_tolerance
            )));
        }
        if !(self.slot_noise_threshold.is_finite() && self.slot_noise_threshold > 0.0) {
            return Err(ExtractError::InvalidOption(format!(
                "slot_noise_threshold must be positive, got {}",
                self.slot_noise_threshold
            )));
        }
        if !(self.overflow_fraction > 0.0 && self.overflow_fraction <= 1.0) {
            return Err(ExtractError::InvalidOption(format!(
                "overflow_fraction must be in (0, 1], got {}",
                self.overflow_fraction
            )));
        }
        if !(self.glyph_width.is_finite() && self.glyph_width >= 0.0) {
            return Err(ExtractError::InvalidOption(format!(
                "glyph_width must be zero or positive, got {}",
                self.glyph_width
            )));
        }
        Ok(())
    }
}
