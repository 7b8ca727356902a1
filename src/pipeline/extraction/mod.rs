//! Image → text → prescription record.

pub mod types;
pub mod preprocess;
pub mod ocr;
pub mod orchestrator;

pub use types::*;
pub use preprocess::*;
pub use ocr::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The OCR binary/engine is missing or misconfigured. Fatal: no text can
    /// be produced at all, so this is never degraded into a partial record.
    #[error("OCR engine not available: {0}")]
    EngineNotAvailable(String),

    #[error("OCR processing failed: {0}")]
    OcrProcessing(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),
}

impl ExtractionError {
    pub fn is_engine_unavailable(&self) -> bool {
        matches!(self, ExtractionError::EngineNotAvailable(_))
    }
}
