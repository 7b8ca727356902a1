//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::core_state::CoreError;
use crate::models::PrescriptionRecord;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    /// Set when extraction succeeded but the save did not.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_data: Option<PrescriptionRecord>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Could not validate credentials")]
    Forbidden,
    #[error("API key not configured on the server")]
    ApiKeyNotConfigured,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Upload exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },
    #[error("OCR engine not available: {0}")]
    EngineNotAvailable(String),
    #[error("Data extracted but failed to save: {reason}")]
    SaveFailed {
        record: Box<PrescriptionRecord>,
        reason: String,
    },
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            ApiError::BadRequest(detail) => (
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                detail.clone(),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Could not validate credentials".to_string(),
            ),
            ApiError::ApiKeyNotConfigured => {
                tracing::error!("Request rejected: API_KEY is not configured");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "API_KEY_NOT_CONFIGURED",
                    "API key not configured on the server".to_string(),
                )
            }
            ApiError::NotFound(detail) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                detail.clone(),
            ),
            ApiError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                format!("Upload exceeds the {limit} byte limit"),
            ),
            ApiError::EngineNotAvailable(detail) => {
                tracing::error!(detail, "OCR engine not available");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "OCR_ENGINE_UNAVAILABLE",
                    "OCR engine is not installed or not configured on the server".to_string(),
                )
            }
            ApiError::SaveFailed { record, reason } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "SAVE_FAILED",
                format!(
                    "Data extracted but failed to save to database: {reason}. Patient ID: {}",
                    record.patient_id
                ),
            ),
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let (patient_id, extracted_data) = match self {
            ApiError::SaveFailed { record, .. } => (Some(record.patient_id.clone()), Some(*record)),
            _ => (None, None),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                patient_id,
                extracted_data,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::EngineNotAvailable(detail) => ApiError::EngineNotAvailable(detail),
            CoreError::SaveFailed { record, source } => ApiError::SaveFailed {
                record,
                reason: source.to_string(),
            },
            CoreError::Lookup(e) => ApiError::Internal(e.to_string()),
            CoreError::Worker(detail) => ApiError::Internal(detail),
        }
    }
}
