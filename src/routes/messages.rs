use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::AppError;
use crate::models::Message;
use crate::services::message_service::MessageService;
use crate::state::AppState;

/// GET /api/v1/sessions/:id/messages
pub async fn get_message_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = MessageService::history(&state.db, &session_id).await?;
    Ok(Json(messages))
}
