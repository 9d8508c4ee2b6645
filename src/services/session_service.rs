use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::ChatSession;

pub struct SessionService;

impl SessionService {
    pub async fn create(db: &Pool<Postgres>) -> AppResult<ChatSession> {
        let session = ChatSession {
            id: Uuid::new_v4().to_string(),
            created_at: Utc::now(),
        };

        sqlx::query("INSERT INTO sessions (id, created_at) VALUES ($1, $2)")
            .bind(&session.id)
            .bind(session.created_at)
            .execute(db)
            .await?;

        Ok(session)
    }

    pub async fn list(db: &Pool<Postgres>) -> AppResult<Vec<ChatSession>> {
        let sessions = sqlx::query_as::<_, ChatSession>(
            "SELECT id, created_at FROM sessions ORDER BY created_at DESC",
        )
        .fetch_all(db)
        .await?;

        Ok(sessions)
    }

    /// Delete a session. Its messages are retained: the relay tolerates
    /// (and keeps serving) messages whose session no longer exists.
    pub async fn delete(db: &Pool<Postgres>, session_id: &str) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::AppError::NotFound);
        }

        Ok(())
    }
}
