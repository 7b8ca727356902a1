use super::ExtractionError;

/// OCR engine abstraction (allows mocking for tests).
///
/// Implementations may block for a long time; async callers should run
/// them on a blocking worker thread.
pub trait OcrEngine: Send + Sync {
    /// Recognise the text in an encoded image (PNG, JPEG, TIFF).
    ///
    /// Fails with [`ExtractionError::EngineNotAvailable`] when the engine
    /// itself is missing, and with another variant for per-image failures.
    fn recognize_text(&self, image_bytes: &[u8]) -> Result<String, ExtractionError>;

    /// Short engine name for logs and the health endpoint.
    fn name(&self) -> &str;
}
