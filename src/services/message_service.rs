use sqlx::{Pool, Postgres};

use crate::error::AppResult;
use crate::models::Message;

pub struct MessageService;

impl MessageService {
    /// Chronological history for a session, oldest first.
    pub async fn history(db: &Pool<Postgres>, session_id: &str) -> AppResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, session_id, sender, text, file_url, file_type, created_at \
             FROM messages \
             WHERE session_id = $1 \
             ORDER BY created_at ASC \
             LIMIT 200",
        )
        .bind(session_id)
        .fetch_all(db)
        .await?;

        Ok(messages)
    }
}
