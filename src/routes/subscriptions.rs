use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::PushSubscription;
use crate::services::subscription_service::SubscriptionService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubscriptionKeys {
    #[serde(default)]
    pub p256dh: String,
    #[serde(default)]
    pub auth: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterSubscriptionPayload {
    #[serde(default)]
    pub endpoint: String,
    pub keys: Option<SubscriptionKeys>,
    #[serde(default)]
    pub session_id: String,
}

/// POST /api/v1/push/subscriptions
///
/// Rejects malformed registrations (missing endpoint or keys) with 400
/// before they can reach the delivery path.
pub async fn register_subscription(
    State(state): State<AppState>,
    Json(payload): Json<RegisterSubscriptionPayload>,
) -> Result<(StatusCode, Json<PushSubscription>), AppError> {
    let keys = payload
        .keys
        .ok_or_else(|| AppError::BadRequest("subscription keys are required".into()))?;

    let subscription = PushSubscription {
        endpoint: payload.endpoint,
        p256dh: keys.p256dh,
        auth: keys.auth,
        session_id: payload.session_id,
    };

    let registered = SubscriptionService::register(&state.db, subscription).await?;

    Ok((StatusCode::CREATED, Json(registered)))
}
