use std::sync::LazyLock;

use regex::Regex;

use crate::model::Token;

static LAB_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Lab-(\d+)").expect("hardcoded lab regex is valid"));

static ROOM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Room-\s*(?P<code>[^()\s,]+)\s*(?:\((?P<building>[^)]*)\))?")
        .expect("hardcoded room regex is valid")
});

static LAB_ROOM_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Lab-\d+$").expect("hardcoded lab id regex is valid"));

/// The header fragment naming the room a page belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomHeader {
    pub room_id: String,
    /// Index of the header token within the page, excluded from cell content.
    pub token_index: usize,
}

#[must_use]
pub fn room_id_from_header(text: &str) -> String {
    if let Some(captures) = LAB_RE.captures(text) {
        return format!("Lab-{}", &captures[1]);
    }

    if let Some(captures) = ROOM_RE.captures(text) {
        let code = captures["code"].trim();
        let building = captures
            .name("building")
            .map(|value| value.as_str().trim())
            .filter(|value| !value.is_empty());
        if !code.is_empty() {
            return match building {
                Some(building) => format!("{code} {building}"),
                None => code.to_string(),
            };
        }
    }

    text.to_string()
}

/// Finds the first `Room-`/`Lab-` fragment on a page.
#[must_use]
pub fn detect_room_header(tokens: &[Token]) -> Option<RoomHeader> {
    tokens
        .iter()
        .position(|token| token.text.contains("Room-") || token.text.contains("Lab-"))
        .map(|token_index| RoomHeader {
            room_id: room_id_from_header(&tokens[token_index].text),
            token_index,
        })
}

#[must_use]
pub fn is_lab_room(room_id: &str) -> bool {
    LAB_ROOM_ID_RE.is_match(room_id)
}
