use std::borrow::Cow;

use crate::decode::{RawFragment, RawPage};
use crate::model::Token;

/// Percent-decodes and trims one fragment. Empty fragments yield `None`.
#[must_use]
pub fn normalize_fragment(fragment: &RawFragment) -> Option<Token> {
    let decoded = urlencoding::decode(&fragment.text)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| fragment.text.clone());
    let text = decoded.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return None;
    }

    Some(Token::new(fragment.x, fragment.y, text))
}

#[must_use]
pub fn normalize_page(page: &RawPage) -> Vec<Token> {
    page.fragments.iter().filter_map(normalize_fragment).collect()
}
