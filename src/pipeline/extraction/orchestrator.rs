//! Extraction orchestrator: image bytes → OCR → structured record.
//!
//! Structured fields are best-effort. The only failure surfaced to the
//! caller is a missing OCR engine; every other problem still yields a
//! record carrying whatever text was captured (or a placeholder).

use std::sync::Arc;

use crate::models::PrescriptionRecord;
use crate::pipeline::structuring::extract_fields;

use super::preprocess::validate_image;
use super::types::OcrEngine;
use super::ExtractionError;

/// Characters of raw OCR text written to the debug log.
const OCR_PREVIEW_CHARS: usize = 500;

pub struct PrescriptionExtractor {
    ocr: Arc<dyn OcrEngine>,
    max_image_bytes: usize,
}

impl PrescriptionExtractor {
    pub fn new(ocr: Arc<dyn OcrEngine>, max_image_bytes: usize) -> Self {
        Self {
            ocr,
            max_image_bytes,
        }
    }

    pub fn engine_name(&self) -> &str {
        self.ocr.name()
    }

    /// Produce a record from one uploaded image.
    ///
    /// Blocking (OCR runs a subprocess). Each call gets a new patient id,
    /// so identical images give identical fields under different ids.
    pub fn process(&self, image_bytes: &[u8]) -> Result<PrescriptionRecord, ExtractionError> {
        tracing::info!(bytes = image_bytes.len(), "Starting prescription image processing");

        if let Err(e) = validate_image(image_bytes, self.max_image_bytes) {
            tracing::error!(error = %e, "Image rejected before OCR");
            return Ok(PrescriptionRecord::placeholder());
        }

        let text = match self.ocr.recognize_text(image_bytes) {
            Ok(text) => text,
            Err(e) if e.is_engine_unavailable() => {
                tracing::error!(engine = self.ocr.name(), error = %e, "OCR engine not available");
                return Err(e);
            }
            Err(e) => {
                tracing::error!(engine = self.ocr.name(), error = %e, "OCR failed");
                return Ok(PrescriptionRecord::placeholder());
            }
        };

        tracing::debug!(
            chars = text.chars().count(),
            preview = %preview(&text),
            "OCR raw text"
        );

        let fields = extract_fields(&text);
        let record = PrescriptionRecord::new(text, fields);
        tracing::info!(patient_id = %record.patient_id, "Prescription image processing finished");
        Ok(record)
    }
}

fn preview(text: &str) -> String {
    text.chars().take(OCR_PREVIEW_CHARS).collect()
}
