//! Transport-agnostic service state.
//!
//! `CoreState` owns the configuration, the extraction pipeline and the
//! persistence backend. It is built once at startup, wrapped in `Arc`, and
//! shared by every request handler. Nothing in it is mutated after
//! construction; per-request work happens on local buffers only.

use std::sync::Arc;

use crate::config::{ServiceConfig, StoreConfig};
use crate::db::{self, PrescriptionStore, RestStore, SqliteStore};
use crate::models::PrescriptionRecord;
use crate::pipeline::extraction::{
    ExtractionError, OcrEngine, PrescriptionExtractor, TesseractCli,
};

pub struct CoreState {
    pub config: ServiceConfig,
    extractor: Arc<PrescriptionExtractor>,
    store: Arc<dyn PrescriptionStore>,
}

impl CoreState {
    /// Build the Tesseract engine and the configured store.
    ///
    /// Must run outside an async context: the PostgREST store owns a
    /// blocking HTTP client.
    pub fn from_config(config: ServiceConfig) -> Result<Self, db::DatabaseError> {
        let ocr = TesseractCli::new(config.ocr.command.clone())
            .with_languages(&config.ocr.lang)
            .with_psm(config.ocr.psm)
            .with_tessdata_dir(config.ocr.tessdata_dir.clone());

        let store: Arc<dyn PrescriptionStore> = match &config.store {
            StoreConfig::Sqlite { path } => Arc::new(SqliteStore::open(path)?),
            StoreConfig::Supabase {
                url,
                key,
                timeout_secs,
            } => Arc::new(RestStore::new(url, key, *timeout_secs)?),
        };

        Ok(Self::with_parts(config, Arc::new(ocr), store))
    }

    /// Assemble from explicit collaborators (tests, alternative engines).
    pub fn with_parts(
        config: ServiceConfig,
        ocr: Arc<dyn OcrEngine>,
        store: Arc<dyn PrescriptionStore>,
    ) -> Self {
        let extractor = Arc::new(PrescriptionExtractor::new(ocr, config.max_upload_bytes));
        tracing::info!(
            ocr_engine = extractor.engine_name(),
            store = store.backend(),
            "Core state initialized"
        );
        Self {
            config,
            extractor,
            store,
        }
    }

    pub fn ocr_engine(&self) -> &str {
        self.extractor.engine_name()
    }

    pub fn store_backend(&self) -> &'static str {
        self.store.backend()
    }

    /// Extract a record from image bytes on the blocking pool.
    pub async fn extract(&self, image_bytes: Vec<u8>) -> Result<PrescriptionRecord, CoreError> {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.process(&image_bytes))
            .await
            .map_err(|e| CoreError::Worker(e.to_string()))?
            .map_err(CoreError::from)
    }

    /// Extract a record and persist it.
    ///
    /// A failed save still hands the extracted record back inside
    /// [`CoreError::SaveFailed`] so the caller can retry or recover by hand.
    pub async fn extract_and_store(
        &self,
        image_bytes: Vec<u8>,
    ) -> Result<PrescriptionRecord, CoreError> {
        let record = self.extract(image_bytes).await?;

        let store = Arc::clone(&self.store);
        let pending = record.clone();
        let saved = tokio::task::spawn_blocking(move || store.store(&pending))
            .await
            .map_err(|e| CoreError::Worker(e.to_string()))?;

        match saved {
            Ok(stored) => {
                tracing::info!(
                    patient_id = %stored.patient_id,
                    store = self.store.backend(),
                    "Prescription stored"
                );
                Ok(stored)
            }
            Err(source) => {
                tracing::error!(
                    patient_id = %record.patient_id,
                    error = %source,
                    "Failed to store prescription"
                );
                Err(CoreError::SaveFailed {
                    record: Box::new(record),
                    source,
                })
            }
        }
    }

    /// Look up a stored record. `Ok(None)` when no record has that id.
    pub async fn lookup(&self, patient_id: &str) -> Result<Option<PrescriptionRecord>, CoreError> {
        let store = Arc::clone(&self.store);
        let id = patient_id.to_string();
        tokio::task::spawn_blocking(move || store.lookup(&id))
            .await
            .map_err(|e| CoreError::Worker(e.to_string()))?
            .map_err(CoreError::Lookup)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("OCR engine not available: {0}")]
    EngineNotAvailable(String),
    #[error("Failed to save record {}: {source}", record.patient_id)]
    SaveFailed {
        record: Box<PrescriptionRecord>,
        source: db::DatabaseError,
    },
    #[error("Lookup failed: {0}")]
    Lookup(db::DatabaseError),
    #[error("Worker task failed: {0}")]
    Worker(String),
}

impl From<ExtractionError> for CoreError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::EngineNotAvailable(detail) => CoreError::EngineNotAvailable(detail),
            // The extractor only returns engine absence; anything else is a
            // bug in the pipeline and is reported as a worker failure.
            other => CoreError::Worker(other.to_string()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::DatabaseError;
    use crate::models::OCR_FAILURE_PLACEHOLDER;
    use crate::pipeline::extraction::preprocess::sample_png;
    use crate::pipeline::extraction::MockOcrEngine;
    use chrono::NaiveDate;

    pub(crate) const OCR_TEXT: &str = "Patient Name: John Doe   Age: 35   Sex: M\n\
        Date: 01/04/2025\n\
        Diagnosis: Flu\n\
        Rx: Paracetamol 500mg\n\
        \n\
        Signature: Dr. Smith";

    /// Store that rejects every write.
    pub(crate) struct BrokenStore;

    impl PrescriptionStore for BrokenStore {
        fn store(&self, _record: &PrescriptionRecord) -> Result<PrescriptionRecord, DatabaseError> {
            Err(DatabaseError::Remote {
                status: 503,
                message: "store offline".into(),
            })
        }

        fn lookup(&self, _patient_id: &str) -> Result<Option<PrescriptionRecord>, DatabaseError> {
            Err(DatabaseError::Remote {
                status: 503,
                message: "store offline".into(),
            })
        }

        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    pub(crate) fn test_core(engine: MockOcrEngine) -> CoreState {
        CoreState::with_parts(
            ServiceConfig::default(),
            Arc::new(engine),
            Arc::new(SqliteStore::in_memory().unwrap()),
        )
    }

    #[tokio::test]
    async fn extract_and_store_round_trips() {
        let core = test_core(MockOcrEngine::new(OCR_TEXT));
        let stored = core.extract_and_store(sample_png(8, 8)).await.unwrap();
        assert_eq!(stored.name.as_deref(), Some("John Doe"));
        assert_eq!(stored.visit_date, NaiveDate::from_ymd_opt(2025, 4, 1));

        let found = core.lookup(&stored.patient_id).await.unwrap();
        assert_eq!(found, Some(stored));
    }

    #[tokio::test]
    async fn unknown_patient_is_none() {
        let core = test_core(MockOcrEngine::new(OCR_TEXT));
        assert_eq!(core.lookup("no-such-id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_engine_is_reported_distinctly() {
        let core = test_core(MockOcrEngine::unavailable());
        let err = core.extract_and_store(sample_png(8, 8)).await.unwrap_err();
        assert!(matches!(err, CoreError::EngineNotAvailable(_)));
    }

    #[tokio::test]
    async fn ocr_failure_still_stores_placeholder() {
        let core = test_core(MockOcrEngine::failing("unreadable"));
        let stored = core.extract_and_store(sample_png(8, 8)).await.unwrap();
        assert_eq!(stored.raw_ocr_text, OCR_FAILURE_PLACEHOLDER);
        assert!(core.lookup(&stored.patient_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn failed_save_keeps_extracted_record() {
        let core = CoreState::with_parts(
            ServiceConfig::default(),
            Arc::new(MockOcrEngine::new(OCR_TEXT)),
            Arc::new(BrokenStore),
        );
        match core.extract_and_store(sample_png(8, 8)).await.unwrap_err() {
            CoreError::SaveFailed { record, source } => {
                assert_eq!(record.age.as_deref(), Some("35"));
                assert_eq!(record.raw_ocr_text, OCR_TEXT);
                assert!(matches!(source, DatabaseError::Remote { status: 503, .. }));
            }
            other => panic!("expected SaveFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn lookup_failure_is_propagated() {
        let core = CoreState::with_parts(
            ServiceConfig::default(),
            Arc::new(MockOcrEngine::new(OCR_TEXT)),
            Arc::new(BrokenStore),
        );
        assert!(matches!(
            core.lookup("anyone").await.unwrap_err(),
            CoreError::Lookup(_)
        ));
    }

    #[test]
    fn from_config_opens_sqlite_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServiceConfig {
            store: StoreConfig::Sqlite {
                path: dir.path().join("nested").join("rx.db"),
            },
            ..ServiceConfig::default()
        };
        let core = CoreState::from_config(config).unwrap();
        assert_eq!(core.ocr_engine(), "tesseract");
        assert_eq!(core.store_backend(), "sqlite");
        assert!(dir.path().join("nested").join("rx.db").exists());
    }
}
