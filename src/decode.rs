//! Boundary with the document decoder.
//!
//! The decoder is an external collaborator; this module only accepts its
//! finished output, pdf2json-shaped JSON where every text fragment carries a
//! position and one or more percent-encoded runs:
//!
//! ```json
//! {"Pages": [{"Texts": [{"x": 4.2, "y": 1.1, "R": [{"T": "Room-205"}]}]}]}
//! ```
//!
//! Older decoder releases wrap the pages in a `formImage` object; both forms
//! are accepted.

use serde::Deserialize;

use crate::error::ExtractError;
use crate::options::PageSelection;

/// One undecoded fragment as handed over by the decoder.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFragment {
    pub x: f64,
    pub y: f64,
    /// Percent-encoded payload; see [`crate::text::normalize_fragment`].
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawPage {
    pub page_number: u32,
    pub fragments: Vec<RawFragment>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DocumentJson {
    Wrapped {
        #[serde(rename = "formImage")]
        form_image: PagesJson,
    },
    Bare(PagesJson),
}

#[derive(Debug, Deserialize)]
struct PagesJson {
    #[serde(rename = "Pages")]
    pages: Vec<PageJson>,
}

#[derive(Debug, Deserialize)]
struct PageJson {
    #[serde(rename = "Texts", default)]
    texts: Vec<TextJson>,
}

#[derive(Debug, Deserialize)]
struct TextJson {
    x: f64,
    y: f64,
    #[serde(rename = "R", default)]
    runs: Vec<RunJson>,
}

#[derive(Debug, Deserialize)]
struct RunJson {
    #[serde(rename = "T", default)]
    text: String,
}

/// Parses decoder output into numbered pages.
///
/// # Errors
///
/// A malformed document is a hard failure: [`ExtractError::Decode`].
pub fn decode_document(json: &str) -> Result<Vec<RawPage>, ExtractError> {
    let document: DocumentJson = serde_json::from_str(json)?;
    let pages = match document {
        DocumentJson::Wrapped { form_image } => form_image.pages,
        DocumentJson::Bare(pages) => pages.pages,
    };

    Ok(pages
        .into_iter()
        .zip(1_u32..)
        .map(|(page, page_number)| RawPage {
            page_number,
            fragments: page
                .texts
                .into_iter()
                .map(|text| RawFragment {
                    x: text.x,
                    y: text.y,
                    text: text.runs.into_iter().map(|run| run.text).collect(),
                })
                .collect(),
        })
        .collect())
}

pub(crate) fn select_pages<'a>(
    pages: &'a [RawPage],
    selection: Option<&PageSelection>,
) -> Result<Vec<&'a RawPage>, ExtractError> {
    let selected = pages
        .iter()
        .filter(|page| selection.is_none_or(|selection| selection.contains(page.page_number)))
        .collect::<Vec<_>>();

    if selected.is_empty() && !pages.is_empty() {
        return Err(ExtractError::NoPagesSelected);
    }

    Ok(selected)
}
