//! Shared types for the HTTP layer.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core_state::CoreState;
use crate::models::PrescriptionRecord;

/// Shared context for all routes and middleware.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self { core }
    }
}

/// `201` body for a processed upload.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub patient_id: String,
    pub extracted_data: PrescriptionRecord,
}

/// Stored record without the raw OCR text.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientDataResponse {
    pub patient_id: String,
    pub name: Option<String>,
    pub age: Option<String>,
    pub gender: Option<String>,
    pub visit_date: Option<NaiveDate>,
    pub doctor_notes: Option<String>,
}

impl From<PrescriptionRecord> for PatientDataResponse {
    fn from(record: PrescriptionRecord) -> Self {
        Self {
            patient_id: record.patient_id,
            name: record.name,
            age: record.age,
            gender: record.gender,
            visit_date: record.visit_date,
            doctor_notes: record.doctor_notes,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ocr_engine: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrescriptionFields;

    #[test]
    fn patient_data_omits_raw_text() {
        let record = PrescriptionRecord::new(
            "Sex: F".into(),
            PrescriptionFields {
                gender: Some("F".into()),
                visit_date: NaiveDate::from_ymd_opt(2024, 12, 3),
                ..Default::default()
            },
        );
        let id = record.patient_id.clone();
        let json = serde_json::to_value(PatientDataResponse::from(record)).unwrap();
        assert_eq!(json["patient_id"], id.as_str());
        assert_eq!(json["gender"], "F");
        assert_eq!(json["visit_date"], "2024-12-03");
        assert!(json["name"].is_null());
        assert!(json.get("raw_ocr_text").is_none());
    }
}
