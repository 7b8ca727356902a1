//! Prescription upload and patient lookup.
//!
//! `POST /upload_prescription` takes a multipart form with the image in the
//! `file` field, runs OCR + extraction, stores the record and returns it.
//! `GET /get_patient_data/:patient_id` returns the stored structured fields.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, PatientDataResponse, UploadResponse};

/// Multipart field carrying the image.
pub const UPLOAD_FIELD: &str = "file";

const UPLOAD_SUCCESS_MESSAGE: &str = "Prescription uploaded and processed successfully.";

/// `POST /upload_prescription`
pub async fn upload(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let limit = ctx.core.config.max_upload_bytes;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or("<unnamed>").to_string();
        let bytes = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload.ok_or_else(|| {
        ApiError::BadRequest(format!("Missing multipart field '{UPLOAD_FIELD}'"))
    })?;
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("No file content received.".into()));
    }
    if bytes.len() > limit {
        return Err(ApiError::PayloadTooLarge { limit });
    }
    tracing::info!(%file_name, bytes = bytes.len(), "Received prescription upload");

    let record = ctx.core.extract_and_store(bytes.to_vec()).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: UPLOAD_SUCCESS_MESSAGE.to_string(),
            patient_id: record.patient_id.clone(),
            extracted_data: record,
        }),
    ))
}

/// `GET /get_patient_data/:patient_id`
pub async fn get_patient_data(
    State(ctx): State<ApiContext>,
    Path(patient_id): Path<String>,
) -> Result<Json<PatientDataResponse>, ApiError> {
    match ctx.core.lookup(&patient_id).await? {
        Some(record) => {
            tracing::info!(%patient_id, "Patient data retrieved");
            Ok(Json(record.into()))
        }
        None => {
            tracing::warn!(%patient_id, "Patient data not found");
            Err(ApiError::NotFound("Patient data not found".into()))
        }
    }
}

fn multipart_error(err: MultipartError, limit: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge { limit }
    } else {
        ApiError::BadRequest(format!("Error reading file: {}", err.body_text()))
    }
}
