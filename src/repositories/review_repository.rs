use crate::models::{Review, ReviewResponse, ServiceError};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn create(&self, appointment_id: i64, rating: i64, comment: Option<&str>) -> Result<i64, ServiceError>;
    async fn find_by_appointment(&self, appointment_id: i64) -> Result<Option<Review>, ServiceError>;
    async fn find_view(&self, id: i64) -> Result<Option<ReviewResponse>, ServiceError>;
    async fn list_for_business(&self, business_id: i64) -> Result<Vec<ReviewResponse>, ServiceError>;
    /// Average rating and number of reviews across a business's appointments.
    async fn rating_stats(&self, business_id: i64) -> Result<(Option<f64>, i64), ServiceError>;
}

const REVIEW_VIEW_SELECT: &str = "SELECT r.id, r.appointment_id, r.rating, r.comment, cp.full_name AS client_name, \
     s.name AS service_name, r.created_at \
     FROM reviews r \
     JOIN appointments a ON a.id = r.appointment_id \
     JOIN profiles cp ON cp.user_id = a.client_id \
     JOIN services s ON s.id = a.service_id \
     JOIN workers w ON w.id = a.worker_id";

pub struct SqliteReviewRepository {
    pool: SqlitePool,
}

impl SqliteReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReviewRepository for SqliteReviewRepository {
    async fn create(&self, appointment_id: i64, rating: i64, comment: Option<&str>) -> Result<i64, ServiceError> {
        let id = sqlx::query("INSERT INTO reviews (appointment_id, rating, comment, created_at) VALUES (?, ?, ?, ?)")
            .bind(appointment_id)
            .bind(rating)
            .bind(comment)
            .bind(Utc::now().naive_utc())
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        Ok(id)
    }

    async fn find_by_appointment(&self, appointment_id: i64) -> Result<Option<Review>, ServiceError> {
        let review = sqlx::query_as::<_, Review>(
            "SELECT id, appointment_id, rating, comment, created_at FROM reviews WHERE appointment_id = ?",
        )
        .bind(appointment_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(review)
    }

    async fn find_view(&self, id: i64) -> Result<Option<ReviewResponse>, ServiceError> {
        let review = sqlx::query_as::<_, ReviewResponse>(&format!("{} WHERE r.id = ?", REVIEW_VIEW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(review)
    }

    async fn list_for_business(&self, business_id: i64) -> Result<Vec<ReviewResponse>, ServiceError> {
        let reviews = sqlx::query_as::<_, ReviewResponse>(&format!(
            "{} WHERE w.business_id = ? ORDER BY r.created_at DESC, r.id DESC",
            REVIEW_VIEW_SELECT
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reviews)
    }

    async fn rating_stats(&self, business_id: i64) -> Result<(Option<f64>, i64), ServiceError> {
        let stats = sqlx::query_as::<_, (Option<f64>, i64)>(
            "SELECT AVG(r.rating), COUNT(r.id) FROM reviews r \
             JOIN appointments a ON a.id = r.appointment_id \
             JOIN workers w ON w.id = a.worker_id \
             WHERE w.business_id = ?",
        )
        .bind(business_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
