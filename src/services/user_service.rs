use chrono::Utc;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::User;

#[derive(Debug)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub company_name: String,
}

pub struct UserService;

impl UserService {
    /// Create a user together with its chat session. The returned link
    /// embeds the session id so the user lands in their own room.
    pub async fn create(
        db: &Pool<Postgres>,
        request: CreateUserRequest,
        public_base_url: &str,
    ) -> AppResult<User> {
        if request.name.trim().is_empty() {
            return Err(AppError::BadRequest("name cannot be empty".into()));
        }
        if request.email.trim().is_empty() {
            return Err(AppError::BadRequest("email cannot be empty".into()));
        }

        let session_id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query("INSERT INTO sessions (id, created_at) VALUES ($1, $2)")
            .bind(&session_id)
            .bind(now)
            .execute(db)
            .await?;

        let user = User {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: request.email.trim().to_string(),
            company_name: request.company_name.trim().to_string(),
            link: format!(
                "{}/chat/{}",
                public_base_url.trim_end_matches('/'),
                session_id
            ),
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO users (id, name, email, company_name, link, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.company_name)
        .bind(&user.link)
        .bind(user.created_at)
        .execute(db)
        .await?;

        Ok(user)
    }

    pub async fn list(db: &Pool<Postgres>) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, name, email, company_name, link, created_at \
             FROM users ORDER BY created_at DESC",
        )
        .fetch_all(db)
        .await?;

        Ok(users)
    }

    pub async fn delete(db: &Pool<Postgres>, user_id: Uuid) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
