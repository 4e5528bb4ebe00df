//! Page content normalization.
//!
//! Main-content detection happens in the host page; the backend receives raw
//! text and only normalizes it before it is summarized.

/// Upper bound on the characters kept from a page.
pub const MAX_CONTENT_CHARS: usize = 30_000;

/// Turns host-reported page text into the content carried by a valid visit.
pub trait ContentExtractor {
    fn extract(&self, page_text: Option<&str>) -> String;
}

/// Whitespace-collapsing extractor used by default.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl ContentExtractor for PlainTextExtractor {
    fn extract(&self, page_text: Option<&str>) -> String {
        page_text.map(clean_text).unwrap_or_default()
    }
}

/// Collapses whitespace runs into single spaces, trims, and caps the length.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, MAX_CONTENT_CHARS)
}

/// Keeps at most `max` characters, never splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
