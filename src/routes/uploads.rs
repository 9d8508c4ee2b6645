use axum::{extract::State, Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::services::upload_service::PresignedUpload;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PresignUploadPayload {
    pub file_name: String,
    #[serde(default = "default_content_type")]
    pub file_type: String,
}

fn default_content_type() -> String {
    "application/octet-stream".to_string()
}

/// POST /api/v1/uploads
pub async fn presign_upload(
    State(state): State<AppState>,
    Json(payload): Json<PresignUploadPayload>,
) -> Result<Json<PresignedUpload>, AppError> {
    let uploads = state
        .uploads
        .as_ref()
        .ok_or_else(|| AppError::Unavailable("object storage is not configured".into()))?;

    let presigned = uploads
        .presign_put(&payload.file_name, &payload.file_type)
        .await?;

    Ok(Json(presigned))
}
