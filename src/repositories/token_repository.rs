use crate::models::{PasswordResetToken, RefreshToken, ServiceError};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;

#[async_trait]
pub trait TokenRepository: Send + Sync {
    async fn save_refresh_token(&self, user_id: i64, token: &str, expires_at: NaiveDateTime) -> Result<(), ServiceError>;
    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, ServiceError>;
    /// Returns the number of rows removed, 0 when the token was already gone.
    async fn delete_refresh_token(&self, token: &str) -> Result<u64, ServiceError>;
    async fn delete_refresh_tokens_for_user(&self, user_id: i64) -> Result<u64, ServiceError>;

    async fn save_reset_token(&self, user_id: i64, token: &str, expires_at: NaiveDateTime) -> Result<(), ServiceError>;
    async fn find_reset_token(&self, token: &str) -> Result<Option<PasswordResetToken>, ServiceError>;
    async fn mark_reset_token_used(&self, id: i64) -> Result<(), ServiceError>;
    async fn delete_reset_tokens_for_user(&self, user_id: i64) -> Result<(), ServiceError>;

    /// Removes expired refresh tokens and expired or consumed reset tokens.
    async fn purge_expired(&self, now: NaiveDateTime) -> Result<u64, ServiceError>;
}

pub struct SqliteTokenRepository {
    pool: SqlitePool,
}

impl SqliteTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TokenRepository for SqliteTokenRepository {
    async fn save_refresh_token(&self, user_id: i64, token: &str, expires_at: NaiveDateTime) -> Result<(), ServiceError> {
        sqlx::query("INSERT INTO refresh_tokens (user_id, token, expires_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(token)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_refresh_token(&self, token: &str) -> Result<Option<RefreshToken>, ServiceError> {
        let row = sqlx::query_as::<_, RefreshToken>(
            "SELECT id, user_id, token, expires_at FROM refresh_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_refresh_token(&self, token: &str) -> Result<u64, ServiceError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_refresh_tokens_for_user(&self, user_id: i64) -> Result<u64, ServiceError> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn save_reset_token(&self, user_id: i64, token: &str, expires_at: NaiveDateTime) -> Result<(), ServiceError> {
        sqlx::query("INSERT INTO password_reset_tokens (user_id, token, expires_at, used) VALUES (?, ?, ?, 0)")
            .bind(user_id)
            .bind(token)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_reset_token(&self, token: &str) -> Result<Option<PasswordResetToken>, ServiceError> {
        let row = sqlx::query_as::<_, PasswordResetToken>(
            "SELECT id, user_id, token, expires_at, used FROM password_reset_tokens WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn mark_reset_token_used(&self, id: i64) -> Result<(), ServiceError> {
        sqlx::query("UPDATE password_reset_tokens SET used = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_reset_tokens_for_user(&self, user_id: i64) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn purge_expired(&self, now: NaiveDateTime) -> Result<u64, ServiceError> {
        let refresh = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        let reset = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at < ? OR used = 1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(refresh.rows_affected() + reset.rows_affected())
    }
}
