//! Text normalization for EMV fields

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Strip diacritics from `text`.
///
/// The text is put in canonical decomposition (NFD) and every combining
/// mark is dropped, so "São Paulo" becomes "Sao Paulo". Base characters
/// without a decomposition pass through untouched.
pub fn normalize(text: &str) -> String {
    text.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Keep at most `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Normalize then truncate, the treatment merchant name and city get.
pub fn normalize_truncated(text: &str, max: usize) -> String {
    truncate_chars(&normalize(text), max)
}
