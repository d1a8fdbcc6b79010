//! Grapheme-level string utilities.
//!
//! All word handling in the engine operates on extended grapheme clusters,
//! never on raw bytes or chars: indexing a UTF-8 string by byte offset where
//! a user-perceived character is meant corrupts multi-byte input.

use unicode_segmentation::UnicodeSegmentation;

/// Segment a string into its extended grapheme clusters, in order.
/// Empty input yields an empty vec.
pub fn segment(s: &str) -> Vec<String> {
    s.graphemes(true).map(str::to_string).collect()
}

pub fn lowercase(s: &str) -> String {
    s.to_lowercase()
}

pub fn uppercase(s: &str) -> String {
    s.to_uppercase()
}

/// Uppercase the first grapheme, lowercase the rest.
pub fn titlecase(s: &str) -> String {
    let mut graphemes = s.graphemes(true);
    match graphemes.next() {
        Some(first) => {
            let mut out = first.to_uppercase();
            out.push_str(&graphemes.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}

/// Opposite-case form of a single grapheme: uppercased input maps to
/// lowercase, otherwise lowercase maps to uppercase. When neither mapping
/// changes the grapheme the lowercase form is returned as a best effort.
pub fn swap_case(grapheme: &str) -> String {
    let lower = grapheme.to_lowercase();
    if lower != grapheme {
        return lower;
    }
    let upper = grapheme.to_uppercase();
    if upper != grapheme {
        upper
    } else {
        lower
    }
}

/// Trim Unicode whitespace from both ends.
pub fn trim(s: &str) -> &str {
    s.trim_matches(char::is_whitespace)
}

/// Split by a delimiter (a single grapheme or a longer string).
/// The delimiter itself is never part of the output.
pub fn split<'a>(s: &'a str, delimiter: &str) -> Vec<&'a str> {
    s.split(delimiter).collect()
}
