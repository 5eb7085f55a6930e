use crate::models::{Business, ServiceError};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, SqlitePool};

/// A favorite joined with the business it points to.
#[derive(Debug, Clone, FromRow)]
pub struct FavoriteRow {
    pub favorite_id: i64,
    pub favorited_at: NaiveDateTime,
    #[sqlx(flatten)]
    pub business: Business,
}

const FAVORITE_SELECT: &str = "SELECT f.id AS favorite_id, f.created_at AS favorited_at, \
     b.id, b.owner_id, b.name, b.category, b.description, b.address, b.city, b.phone, b.cover_image_url, \
     b.active, b.average_rating, b.total_reviews, b.created_at, b.updated_at \
     FROM favorites f JOIN businesses b ON b.id = f.business_id";

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    async fn page(&self, user_id: i64, limit: i64, offset: i64) -> Result<(Vec<FavoriteRow>, i64), ServiceError>;
    async fn list_all(&self, user_id: i64) -> Result<Vec<FavoriteRow>, ServiceError>;
    async fn business_ids(&self, user_id: i64) -> Result<Vec<i64>, ServiceError>;
    async fn exists(&self, user_id: i64, business_id: i64) -> Result<bool, ServiceError>;
    /// Inserts unless the pair already exists. Returns whether a row was added.
    async fn add(&self, user_id: i64, business_id: i64) -> Result<bool, ServiceError>;
    async fn remove(&self, user_id: i64, business_id: i64) -> Result<bool, ServiceError>;
    async fn count(&self, user_id: i64) -> Result<i64, ServiceError>;
}

pub struct SqliteFavoriteRepository {
    pool: SqlitePool,
}

impl SqliteFavoriteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FavoriteRepository for SqliteFavoriteRepository {
    async fn page(&self, user_id: i64, limit: i64, offset: i64) -> Result<(Vec<FavoriteRow>, i64), ServiceError> {
        let total = self.count(user_id).await?;

        let rows = sqlx::query_as::<_, FavoriteRow>(&format!(
            "{} WHERE f.user_id = ? ORDER BY f.created_at DESC, f.id DESC LIMIT ? OFFSET ?",
            FAVORITE_SELECT
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    async fn list_all(&self, user_id: i64) -> Result<Vec<FavoriteRow>, ServiceError> {
        let rows = sqlx::query_as::<_, FavoriteRow>(&format!(
            "{} WHERE f.user_id = ? ORDER BY f.created_at DESC, f.id DESC",
            FAVORITE_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn business_ids(&self, user_id: i64) -> Result<Vec<i64>, ServiceError> {
        let ids = sqlx::query_scalar::<_, i64>("SELECT business_id FROM favorites WHERE user_id = ? ORDER BY business_id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    async fn exists(&self, user_id: i64, business_id: i64) -> Result<bool, ServiceError> {
        let found = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM favorites WHERE user_id = ? AND business_id = ?")
            .bind(user_id)
            .bind(business_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(found > 0)
    }

    async fn add(&self, user_id: i64, business_id: i64) -> Result<bool, ServiceError> {
        let result = sqlx::query("INSERT OR IGNORE INTO favorites (user_id, business_id, created_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(business_id)
            .bind(Utc::now().naive_utc())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, user_id: i64, business_id: i64) -> Result<bool, ServiceError> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND business_id = ?")
            .bind(user_id)
            .bind(business_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, user_id: i64) -> Result<i64, ServiceError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM favorites WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
