//! Heuristic structuring of OCR text into prescription fields.

pub mod fields;
pub mod dates;
pub mod notes;
pub mod orchestrator;

pub use fields::*;
pub use dates::*;
pub use notes::*;
pub use orchestrator::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StructuringError {
    #[error("Invalid field pattern: {0}")]
    InvalidPattern(String),

    #[error("Field pattern has no capture group: {0}")]
    MissingCaptureGroup(String),
}
