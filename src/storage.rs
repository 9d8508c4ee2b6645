use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::error::AppResult;
use crate::models::{Message, PushSubscription};

/// The persistence operations the fan-out pipeline depends on. Delivery
/// code goes through this seam and never touches SQL directly.
#[async_trait]
pub trait RelayStore: Send + Sync {
    async fn insert_message(&self, message: &Message) -> AppResult<()>;

    async fn subscriptions_for_session(
        &self,
        session_id: &str,
    ) -> AppResult<Vec<PushSubscription>>;

    async fn remove_subscription(&self, endpoint: &str) -> AppResult<()>;
}

/// Postgres-backed store used in production.
#[derive(Clone)]
pub struct PgRelayStore {
    db: Pool<Postgres>,
}

impl PgRelayStore {
    pub fn new(db: Pool<Postgres>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RelayStore for PgRelayStore {
    async fn insert_message(&self, message: &Message) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO messages (id, session_id, sender, text, file_url, file_type, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(message.id)
        .bind(&message.session_id)
        .bind(&message.sender)
        .bind(&message.text)
        .bind(&message.file_url)
        .bind(&message.file_type)
        .bind(message.created_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn subscriptions_for_session(
        &self,
        session_id: &str,
    ) -> AppResult<Vec<PushSubscription>> {
        let subscriptions = sqlx::query_as::<_, PushSubscription>(
            "SELECT endpoint, p256dh, auth, session_id \
             FROM push_subscriptions \
             WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_all(&self.db)
        .await?;

        Ok(subscriptions)
    }

    async fn remove_subscription(&self, endpoint: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM push_subscriptions WHERE endpoint = $1")
            .bind(endpoint)
            .execute(&self.db)
            .await?;

        Ok(())
    }
}
