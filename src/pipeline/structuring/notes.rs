//! Doctor's notes: the free text that follows a section header such as
//! `Rx:` or `Diagnosis:`.
//!
//! Unlike the single-line field matchers, the header that ends furthest into
//! the text wins, so a later `Rx:` beats an earlier `Diagnosis:`.
//! This is a heuristic; section boundaries are a best guess.

use std::sync::LazyLock;

use regex::Regex;

pub const NOTES_KEYWORDS: &[&str] = &[
    "Rx",
    "Diagnosis",
    "Notes",
    "Advice",
    "Medication",
    "Prescription",
];

/// Header keyword followed by any run of whitespace and colons.
static NOTES_HEADERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    NOTES_KEYWORDS
        .iter()
        .map(|k| Regex::new(&format!(r"(?i){}[\s:]+", regex::escape(k))).unwrap())
        .collect()
});

/// End of a notes body: a blank line, or a signature/doctor marker.
static NOTES_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n|Signature:|Doctor:").unwrap());

/// Extract the notes body after the furthest-ending section header.
///
/// Only the first occurrence of each keyword is considered. Returns `None`
/// if no keyword is present or the body is empty; there is no fallback chunk.
pub fn extract_notes(text: &str) -> Option<String> {
    let start = NOTES_HEADERS
        .iter()
        .filter_map(|re| re.find(text).map(|m| m.end()))
        .max();

    let Some(start) = start else {
        tracing::warn!("Could not identify a doctor's notes section");
        return None;
    };

    let body = text[start..].trim();
    let body = match NOTES_END.find(body) {
        Some(m) => &body[..m.start()],
        None => body,
    };
    let body = body.trim();

    if body.is_empty() {
        tracing::warn!("Doctor's notes section header found with no content");
        None
    } else {
        Some(body.to_string())
    }
}
