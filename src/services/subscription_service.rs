use sqlx::{Pool, Postgres};

use crate::error::{AppError, AppResult};
use crate::models::PushSubscription;

pub struct SubscriptionService;

impl SubscriptionService {
    /// Register (or re-register) a push subscription. Upsert is keyed by
    /// endpoint: a client registering again replaces its previous keys and
    /// session binding. Malformed registrations are rejected here, before
    /// anything reaches the fan-out path.
    pub async fn register(
        db: &Pool<Postgres>,
        subscription: PushSubscription,
    ) -> AppResult<PushSubscription> {
        validate(&subscription)?;

        sqlx::query(
            "INSERT INTO push_subscriptions (endpoint, p256dh, auth, session_id) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (endpoint) DO UPDATE \
             SET p256dh = EXCLUDED.p256dh, \
                 auth = EXCLUDED.auth, \
                 session_id = EXCLUDED.session_id",
        )
        .bind(&subscription.endpoint)
        .bind(&subscription.p256dh)
        .bind(&subscription.auth)
        .bind(&subscription.session_id)
        .execute(db)
        .await?;

        Ok(subscription)
    }
}

fn validate(subscription: &PushSubscription) -> AppResult<()> {
    if subscription.endpoint.trim().is_empty() {
        return Err(AppError::BadRequest("endpoint cannot be empty".into()));
    }
    if subscription.p256dh.trim().is_empty() || subscription.auth.trim().is_empty() {
        return Err(AppError::BadRequest(
            "subscription keys (p256dh, auth) are required".into(),
        ));
    }
    if subscription.session_id.trim().is_empty() {
        return Err(AppError::BadRequest("session_id cannot be empty".into()));
    }
    Ok(())
}
