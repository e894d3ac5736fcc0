//! Text normalization applied once before any pattern matching.

use super::patterns::{SPACED_HYPHEN, WHITESPACE_RUN};

/// Normalize raw OCR text.
///
/// Upper-cases, maps en/em dashes to `-`, removes whitespace around hyphens
/// and collapses whitespace runs to a single space.
pub fn normalize_text(text: &str) -> String {
    let upper = text.to_uppercase().replace(['\u{2013}', '\u{2014}'], "-");
    let joined = SPACED_HYPHEN.replace_all(&upper, "-");
    WHITESPACE_RUN.replace_all(&joined, " ").into_owned()
}
