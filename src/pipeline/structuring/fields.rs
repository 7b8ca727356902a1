//! Keyword-anchored extraction of single-line fields (name, age, gender).
//!
//! A matcher is an ordered list of `(label, regex)` rules. Order is a
//! priority list: the first label that matches wins, so specific labels
//! ("Patient Name") must come before generic ones ("Name").

use std::sync::LazyLock;

use regex::Regex;

use super::StructuringError;

/// Captures everything after a colon and optional whitespace, up to end of line.
pub const DEFAULT_VALUE_PATTERN: &str = r":\s*(.*)";

/// Cuts a captured value where an adjacent field starts: a run of two or more
/// whitespace characters, or a `Capitalized:` label. Case-sensitive on purpose.
static TRAILING_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}|[A-Z][a-z]+:").unwrap());

/// One label and its compiled search pattern.
#[derive(Debug, Clone)]
struct FieldRule {
    label: String,
    regex: Regex,
}

/// Ordered keyword rules for one field.
#[derive(Debug, Clone)]
pub struct FieldMatcher {
    rules: Vec<FieldRule>,
}

impl FieldMatcher {
    /// Build a matcher from labels in priority order and a value pattern.
    ///
    /// The value pattern must contain a capture group; group 1 is the value.
    /// Labels are matched literally and case-insensitively.
    pub fn new(keywords: &[&str], value_pattern: &str) -> Result<Self, StructuringError> {
        let mut rules = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let source = format!("(?i){}{}", regex::escape(keyword), value_pattern);
            let regex = Regex::new(&source)
                .map_err(|e| StructuringError::InvalidPattern(e.to_string()))?;
            if regex.captures_len() < 2 {
                return Err(StructuringError::MissingCaptureGroup(value_pattern.to_string()));
            }
            rules.push(FieldRule {
                label: (*keyword).to_string(),
                regex,
            });
        }
        Ok(Self { rules })
    }

    /// Matcher using [`DEFAULT_VALUE_PATTERN`].
    pub fn with_default_pattern(keywords: &[&str]) -> Result<Self, StructuringError> {
        Self::new(keywords, DEFAULT_VALUE_PATTERN)
    }

    /// Value for the first label (in priority order) that yields a non-empty value.
    ///
    /// Only the first occurrence of each label is looked at.
    pub fn find(&self, text: &str) -> Option<String> {
        for rule in &self.rules {
            let Some(caps) = rule.regex.captures(text) else {
                continue;
            };
            let Some(raw) = caps.get(1) else {
                continue;
            };
            if let Some(value) = clean_value(raw.as_str()) {
                tracing::trace!(label = %rule.label, value = %value, "Field label matched");
                return Some(value);
            }
        }
        None
    }
}

/// Trim a captured value and drop anything that belongs to a neighbouring field.
fn clean_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let head = match TRAILING_FIELD.find(trimmed) {
        Some(m) => &trimmed[..m.start()],
        None => trimmed,
    };
    let value = head.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// One-shot form of [`FieldMatcher`]: compile the rules and search `text`.
///
/// An unusable value pattern is logged and treated as "no match".
pub fn extract_field(text: &str, keywords: &[&str], value_pattern: &str) -> Option<String> {
    match FieldMatcher::new(keywords, value_pattern) {
        Ok(matcher) => matcher.find(text),
        Err(e) => {
            tracing::warn!(error = %e, "Skipping field with unusable pattern");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "Name: John Doe   Age: 35   Sex: M";

    #[test]
    fn age_is_cut_before_next_label() {
        assert_eq!(
            extract_field(LINE, &["Age"], DEFAULT_VALUE_PATTERN).as_deref(),
            Some("35")
        );
    }

    #[test]
    fn name_is_cut_at_whitespace_run() {
        assert_eq!(
            extract_field(LINE, &["Patient Name", "Name"], DEFAULT_VALUE_PATTERN).as_deref(),
            Some("John Doe")
        );
    }

    #[test]
    fn name_is_cut_at_single_spaced_label() {
        let text = "Name: Jane Roe Age: 41";
        assert_eq!(
            extract_field(text, &["Name"], DEFAULT_VALUE_PATTERN).as_deref(),
            Some("Jane Roe")
        );
    }

    #[test]
    fn keyword_order_is_priority_not_position() {
        let text = "Name: Guardian Smith\nPatient Name: Alice Smith";
        let matcher = FieldMatcher::with_default_pattern(&["Patient Name", "Name"]).unwrap();
        assert_eq!(matcher.find(text).as_deref(), Some("Alice Smith"));
    }

    #[test]
    fn label_match_is_case_insensitive() {
        let text = "PATIENT NAME: bob stone\nAGE: 6 months";
        assert_eq!(
            extract_field(text, &["Patient Name"], DEFAULT_VALUE_PATTERN).as_deref(),
            Some("bob stone")
        );
        assert_eq!(
            extract_field(text, &["Age"], DEFAULT_VALUE_PATTERN).as_deref(),
            Some("6 months")
        );
    }

    #[test]
    fn first_occurrence_of_a_label_is_used() {
        let text = "Age: 30\nAge: 31";
        assert_eq!(
            extract_field(text, &["Age"], DEFAULT_VALUE_PATTERN).as_deref(),
            Some("30")
        );
    }

    #[test]
    fn absent_when_no_label_present() {
        let text = "Paracetamol 500mg twice daily";
        assert_eq!(extract_field(text, &["Gender", "Sex"], DEFAULT_VALUE_PATTERN), None);
    }

    #[test]
    fn empty_value_falls_through_to_next_label() {
        let text = "Gender:\t\nSex: F";
        // "Gender:" captures across the newline into "Sex: F", which is then cut
        // at the "Sex:" label, leaving nothing; the "Sex" rule supplies the value.
        assert_eq!(
            extract_field(text, &["Gender", "Sex"], DEFAULT_VALUE_PATTERN).as_deref(),
            Some("F")
        );
    }

    #[test]
    fn empty_value_is_absent() {
        assert_eq!(extract_field("Age:   ", &["Age"], DEFAULT_VALUE_PATTERN), None);
    }

    #[test]
    fn label_metacharacters_are_literal() {
        let text = "Wt.(kg): 70";
        assert_eq!(
            extract_field(text, &["Wt.(kg)"], DEFAULT_VALUE_PATTERN).as_deref(),
            Some("70")
        );
    }

    #[test]
    fn custom_value_pattern() {
        let text = "Age 42 years";
        assert_eq!(
            extract_field(text, &["Age"], r"\s+(\d+)").as_deref(),
            Some("42")
        );
    }

    #[test]
    fn pattern_without_group_is_rejected() {
        let err = FieldMatcher::new(&["Age"], r":\s*\d+").unwrap_err();
        assert!(matches!(err, StructuringError::MissingCaptureGroup(_)));
        assert_eq!(extract_field("Age: 3", &["Age"], r":\s*\d+"), None);
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = FieldMatcher::new(&["Age"], r":\s*(").unwrap_err();
        assert!(matches!(err, StructuringError::InvalidPattern(_)));
    }
}
