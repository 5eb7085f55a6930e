use crate::models::{
    Business, BusinessCategory, BusinessImage, CreateBusinessRequest, ServiceError,
    UpdateBusinessRequest,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const BUSINESS_COLUMNS: &str = "id, owner_id, name, category, description, address, city, phone, \
     cover_image_url, active, average_rating, total_reviews, created_at, updated_at";

const SEARCH_FILTER: &str = "WHERE active = 1 \
     AND (? IS NULL OR LOWER(name) LIKE ? OR LOWER(COALESCE(description, '')) LIKE ? OR LOWER(COALESCE(city, '')) LIKE ?) \
     AND (? IS NULL OR category = ?) \
     AND (? IS NULL OR LOWER(COALESCE(city, '')) LIKE ?)";

#[derive(Debug, Default, Clone)]
pub struct BusinessFilter {
    pub query: Option<String>,
    pub category: Option<BusinessCategory>,
    pub city: Option<String>,
}

impl BusinessFilter {
    fn query_pattern(&self) -> Option<String> {
        like_pattern(self.query.as_deref())
    }

    fn city_pattern(&self) -> Option<String> {
        like_pattern(self.city.as_deref())
    }
}

fn like_pattern(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| format!("%{}%", v.to_lowercase()))
}

#[async_trait]
pub trait BusinessRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Business>, ServiceError>;
    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Business>, ServiceError>;
    async fn search(&self, filter: &BusinessFilter, limit: i64, offset: i64) -> Result<(Vec<Business>, i64), ServiceError>;
    async fn create(&self, owner_id: i64, form: &CreateBusinessRequest) -> Result<i64, ServiceError>;
    async fn update(&self, id: i64, changes: &UpdateBusinessRequest) -> Result<(), ServiceError>;
    async fn deactivate(&self, id: i64) -> Result<(), ServiceError>;
    async fn set_rating(&self, id: i64, average_rating: Option<f64>, total_reviews: i64) -> Result<(), ServiceError>;

    async fn list_images(&self, business_id: i64) -> Result<Vec<BusinessImage>, ServiceError>;
    async fn find_image(&self, image_id: i64) -> Result<Option<BusinessImage>, ServiceError>;
    /// Appends an image after the current last one.
    async fn add_image(&self, business_id: i64, image_url: &str, caption: Option<&str>) -> Result<BusinessImage, ServiceError>;
    async fn delete_image(&self, image_id: i64) -> Result<(), ServiceError>;
}

pub struct SqliteBusinessRepository {
    pool: SqlitePool,
}

impl SqliteBusinessRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessRepository for SqliteBusinessRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Business>, ServiceError> {
        let business = sqlx::query_as::<_, Business>(&format!(
            "SELECT {} FROM businesses WHERE id = ?",
            BUSINESS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(business)
    }

    async fn find_by_owner(&self, owner_id: i64) -> Result<Vec<Business>, ServiceError> {
        let businesses = sqlx::query_as::<_, Business>(&format!(
            "SELECT {} FROM businesses WHERE owner_id = ? AND active = 1 ORDER BY created_at DESC, id DESC",
            BUSINESS_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(businesses)
    }

    async fn search(&self, filter: &BusinessFilter, limit: i64, offset: i64) -> Result<(Vec<Business>, i64), ServiceError> {
        let query_pattern = filter.query_pattern();
        let city_pattern = filter.city_pattern();

        let total = sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM businesses {}", SEARCH_FILTER))
            .bind(&query_pattern)
            .bind(&query_pattern)
            .bind(&query_pattern)
            .bind(&query_pattern)
            .bind(filter.category)
            .bind(filter.category)
            .bind(&city_pattern)
            .bind(&city_pattern)
            .fetch_one(&self.pool)
            .await?;

        let businesses = sqlx::query_as::<_, Business>(&format!(
            "SELECT {} FROM businesses {} \
             ORDER BY average_rating IS NULL, average_rating DESC, total_reviews DESC, id ASC \
             LIMIT ? OFFSET ?",
            BUSINESS_COLUMNS, SEARCH_FILTER
        ))
        .bind(&query_pattern)
        .bind(&query_pattern)
        .bind(&query_pattern)
        .bind(&query_pattern)
        .bind(filter.category)
        .bind(filter.category)
        .bind(&city_pattern)
        .bind(&city_pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((businesses, total))
    }

    async fn create(&self, owner_id: i64, form: &CreateBusinessRequest) -> Result<i64, ServiceError> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            "INSERT INTO businesses (owner_id, name, category, description, address, city, phone, cover_image_url, \
             active, total_reviews, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1, 0, ?, ?)",
        )
        .bind(owner_id)
        .bind(form.name.trim())
        .bind(form.category)
        .bind(&form.description)
        .bind(&form.address)
        .bind(&form.city)
        .bind(&form.phone)
        .bind(&form.cover_image_url)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    async fn update(&self, id: i64, changes: &UpdateBusinessRequest) -> Result<(), ServiceError> {
        sqlx::query(
            "UPDATE businesses SET name = COALESCE(?, name), category = COALESCE(?, category), \
             description = COALESCE(?, description), address = COALESCE(?, address), city = COALESCE(?, city), \
             phone = COALESCE(?, phone), cover_image_url = COALESCE(?, cover_image_url), updated_at = ? WHERE id = ?",
        )
        .bind(changes.name.as_deref().map(str::trim))
        .bind(changes.category)
        .bind(&changes.description)
        .bind(&changes.address)
        .bind(&changes.city)
        .bind(&changes.phone)
        .bind(&changes.cover_image_url)
        .bind(Utc::now().naive_utc())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn deactivate(&self, id: i64) -> Result<(), ServiceError> {
        sqlx::query("UPDATE businesses SET active = 0, updated_at = ? WHERE id = ?")
            .bind(Utc::now().naive_utc())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_rating(&self, id: i64, average_rating: Option<f64>, total_reviews: i64) -> Result<(), ServiceError> {
        sqlx::query("UPDATE businesses SET average_rating = ?, total_reviews = ?, updated_at = ? WHERE id = ?")
            .bind(average_rating)
            .bind(total_reviews)
            .bind(Utc::now().naive_utc())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_images(&self, business_id: i64) -> Result<Vec<BusinessImage>, ServiceError> {
        let images = sqlx::query_as::<_, BusinessImage>(
            "SELECT id, business_id, image_url, caption, display_order FROM business_images \
             WHERE business_id = ? ORDER BY display_order, id",
        )
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(images)
    }

    async fn find_image(&self, image_id: i64) -> Result<Option<BusinessImage>, ServiceError> {
        let image = sqlx::query_as::<_, BusinessImage>(
            "SELECT id, business_id, image_url, caption, display_order FROM business_images WHERE id = ?",
        )
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(image)
    }

    async fn add_image(&self, business_id: i64, image_url: &str, caption: Option<&str>) -> Result<BusinessImage, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let next_order = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(MAX(display_order), -1) + 1 FROM business_images WHERE business_id = ?",
        )
        .bind(business_id)
        .fetch_one(&mut *tx)
        .await?;

        let id = sqlx::query(
            "INSERT INTO business_images (business_id, image_url, caption, display_order) VALUES (?, ?, ?, ?)",
        )
        .bind(business_id)
        .bind(image_url)
        .bind(caption)
        .bind(next_order)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        tx.commit().await?;

        Ok(BusinessImage {
            id,
            business_id,
            image_url: image_url.to_string(),
            caption: caption.map(str::to_string),
            display_order: next_order,
        })
    }

    async fn delete_image(&self, image_id: i64) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM business_images WHERE id = ?")
            .bind(image_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
