use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;
use crate::services::user_service::{CreateUserRequest, UserService};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserPayload {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub company_name: String,
}

/// POST /api/v1/users
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = UserService::create(
        &state.db,
        CreateUserRequest {
            name: payload.name,
            email: payload.email,
            company_name: payload.company_name,
        },
        &state.config.public_base_url,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let users = UserService::list(&state.db).await?;
    Ok(Json(users))
}

/// DELETE /api/v1/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    UserService::delete(&state.db, user_id).await?;
    Ok(Json(json!({ "deleted": user_id })))
}
