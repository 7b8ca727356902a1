//! Runs every field extractor over one OCR text.
//!
//! Extractors are independent: a panic in one is caught, logged, and leaves
//! only that field empty.

use std::panic::{self, AssertUnwindSafe};
use std::sync::LazyLock;

use crate::models::PrescriptionFields;

use super::dates::extract_date;
use super::fields::FieldMatcher;
use super::notes::extract_notes;

pub const NAME_LABELS: &[&str] = &["Patient Name", "Name"];
pub const AGE_LABELS: &[&str] = &["Age"];
pub const GENDER_LABELS: &[&str] = &["Gender", "Sex"];

static NAME_MATCHER: LazyLock<FieldMatcher> =
    LazyLock::new(|| FieldMatcher::with_default_pattern(NAME_LABELS).unwrap());
static AGE_MATCHER: LazyLock<FieldMatcher> =
    LazyLock::new(|| FieldMatcher::with_default_pattern(AGE_LABELS).unwrap());
static GENDER_MATCHER: LazyLock<FieldMatcher> =
    LazyLock::new(|| FieldMatcher::with_default_pattern(GENDER_LABELS).unwrap());

/// Populate every field that can be recognised in `text`.
pub fn extract_fields(text: &str) -> PrescriptionFields {
    let fields = PrescriptionFields {
        name: guarded("name", || NAME_MATCHER.find(text)),
        age: guarded("age", || AGE_MATCHER.find(text)),
        gender: guarded("gender", || GENDER_MATCHER.find(text)),
        visit_date: guarded("visit_date", || extract_date(text)),
        doctor_notes: guarded("doctor_notes", || extract_notes(text)),
    };

    tracing::info!(
        found = fields.found_count(),
        name = ?fields.name,
        age = ?fields.age,
        gender = ?fields.gender,
        visit_date = ?fields.visit_date,
        notes_chars = fields.doctor_notes.as_ref().map_or(0, |n| n.chars().count()),
        "Extraction results"
    );
    fields
}

/// Run one extractor, turning a panic into an absent field.
pub(crate) fn guarded<T>(field: &'static str, extractor: impl FnOnce() -> Option<T>) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(extractor)) {
        Ok(value) => value,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!(field, reason = %reason, "Field extraction failed, leaving it empty");
            None
        }
    }
}
