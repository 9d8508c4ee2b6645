use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::error::AppError;
use crate::models::ChatSession;
use crate::services::session_service::SessionService;
use crate::state::AppState;

/// POST /api/v1/sessions
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ChatSession>), AppError> {
    let session = SessionService::create(&state.db).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/sessions
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<ChatSession>>, AppError> {
    let sessions = SessionService::list(&state.db).await?;
    Ok(Json(sessions))
}

/// DELETE /api/v1/sessions/:id
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    SessionService::delete(&state.db, &session_id).await?;
    Ok(Json(json!({ "deleted": session_id })))
}
