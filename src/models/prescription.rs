use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Stored in place of OCR output when the image could not be read at all.
pub const OCR_FAILURE_PLACEHOLDER: &str = "Error during OCR processing.";

/// Structured fields pulled out of OCR text. Every field is best-effort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionFields {
    pub name: Option<String>,
    /// Free text on purpose: "6 months", "~40" and similar are common.
    pub age: Option<String>,
    pub gender: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub doctor_notes: Option<String>,
}

impl PrescriptionFields {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.visit_date.is_none()
            && self.doctor_notes.is_none()
    }

    /// Number of fields that were recognised.
    pub fn found_count(&self) -> usize {
        [
            self.name.is_some(),
            self.age.is_some(),
            self.gender.is_some(),
            self.visit_date.is_some(),
            self.doctor_notes.is_some(),
        ]
        .iter()
        .filter(|found| **found)
        .count()
    }
}

/// One extraction result, keyed by a freshly generated patient id.
///
/// Created once per upload and never mutated afterwards. The raw OCR text is
/// always kept so that fields the heuristics missed can be recovered by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrescriptionRecord {
    pub patient_id: String,
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub doctor_notes: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub raw_ocr_text: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl PrescriptionRecord {
    /// Assemble a record with a new random (v4) patient id.
    pub fn new(raw_ocr_text: String, fields: PrescriptionFields) -> Self {
        Self {
            patient_id: Uuid::new_v4().to_string(),
            name: fields.name,
            age: fields.age,
            gender: fields.gender,
            visit_date: fields.visit_date,
            doctor_notes: fields.doctor_notes,
            raw_ocr_text,
        }
    }

    /// Record for an image whose text could not be obtained.
    pub fn placeholder() -> Self {
        Self::new(OCR_FAILURE_PLACEHOLDER.to_string(), PrescriptionFields::default())
    }

    pub fn fields(&self) -> PrescriptionFields {
        PrescriptionFields {
            name: self.name.clone(),
            age: self.age.clone(),
            gender: self.gender.clone(),
            visit_date: self.visit_date,
            doctor_notes: self.doctor_notes.clone(),
        }
    }
}
