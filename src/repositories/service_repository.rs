use crate::models::{CreateServiceRequest, ServiceError, ServiceOffering, UpdateServiceRequest};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const SERVICE_COLUMNS: &str =
    "id, business_id, name, description, duration_minutes, price, image_url, active, created_at";

#[async_trait]
pub trait ServiceOfferingRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<ServiceOffering>, ServiceError>;
    async fn list_active(&self, business_id: i64) -> Result<Vec<ServiceOffering>, ServiceError>;
    async fn create(&self, business_id: i64, form: &CreateServiceRequest) -> Result<i64, ServiceError>;
    async fn update(&self, id: i64, changes: &UpdateServiceRequest) -> Result<(), ServiceError>;
    async fn deactivate(&self, id: i64) -> Result<(), ServiceError>;
}

pub struct SqliteServiceOfferingRepository {
    pool: SqlitePool,
}

impl SqliteServiceOfferingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceOfferingRepository for SqliteServiceOfferingRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<ServiceOffering>, ServiceError> {
        let service = sqlx::query_as::<_, ServiceOffering>(&format!(
            "SELECT {} FROM services WHERE id = ?",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(service)
    }

    async fn list_active(&self, business_id: i64) -> Result<Vec<ServiceOffering>, ServiceError> {
        let services = sqlx::query_as::<_, ServiceOffering>(&format!(
            "SELECT {} FROM services WHERE business_id = ? AND active = 1 ORDER BY name, id",
            SERVICE_COLUMNS
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    async fn create(&self, business_id: i64, form: &CreateServiceRequest) -> Result<i64, ServiceError> {
        let id = sqlx::query(
            "INSERT INTO services (business_id, name, description, duration_minutes, price, image_url, active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(business_id)
        .bind(form.name.trim())
        .bind(&form.description)
        .bind(form.duration_minutes)
        .bind(form.price)
        .bind(&form.image_url)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    async fn update(&self, id: i64, changes: &UpdateServiceRequest) -> Result<(), ServiceError> {
        sqlx::query(
            "UPDATE services SET name = COALESCE(?, name), description = COALESCE(?, description), \
             duration_minutes = COALESCE(?, duration_minutes), price = COALESCE(?, price), \
             image_url = COALESCE(?, image_url), active = COALESCE(?, active) WHERE id = ?",
        )
        .bind(changes.name.as_deref().map(str::trim))
        .bind(&changes.description)
        .bind(changes.duration_minutes)
        .bind(changes.price)
        .bind(&changes.image_url)
        .bind(changes.active)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn deactivate(&self, id: i64) -> Result<(), ServiceError> {
        sqlx::query("UPDATE services SET active = 0 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
