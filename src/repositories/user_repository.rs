use crate::models::{Profile, Role, ServiceError, UpdateProfileRequest, User, UserResponse};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const USER_VIEW_SELECT: &str = "SELECT u.id, u.email, u.role, p.full_name, p.phone, p.bio, p.avatar_url, u.created_at \
     FROM users u JOIN profiles p ON p.user_id = u.id";

pub struct NewUser<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: Role,
    pub full_name: &'a str,
    pub phone: Option<&'a str>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ServiceError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError>;
    async fn find_profile(&self, user_id: i64) -> Result<Option<Profile>, ServiceError>;
    async fn find_view(&self, id: i64) -> Result<Option<UserResponse>, ServiceError>;
    async fn search_by_email(&self, fragment: &str, limit: i64) -> Result<Vec<UserResponse>, ServiceError>;
    /// Creates the account and its profile in one transaction.
    async fn create(&self, user: NewUser<'_>) -> Result<User, ServiceError>;
    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), ServiceError>;
    async fn update_role(&self, user_id: i64, role: Role) -> Result<(), ServiceError>;
    async fn update_profile(&self, user_id: i64, changes: &UpdateProfileRequest) -> Result<(), ServiceError>;
}

/// A unique violation on insert means the email is taken.
fn duplicate_email(err: sqlx::Error) -> ServiceError {
    let taken = matches!(&err, sqlx::Error::Database(db_err) if db_err.is_unique_violation());
    if taken {
        ServiceError::ValidationError("Email is already registered".to_string())
    } else {
        ServiceError::from(err)
    }
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, role, enabled, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ServiceError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, role, enabled, created_at FROM users WHERE email = ? COLLATE NOCASE",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_profile(&self, user_id: i64) -> Result<Option<Profile>, ServiceError> {
        let profile = sqlx::query_as::<_, Profile>(
            "SELECT user_id, full_name, avatar_url, bio, phone FROM profiles WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(profile)
    }

    async fn find_view(&self, id: i64) -> Result<Option<UserResponse>, ServiceError> {
        let view = sqlx::query_as::<_, UserResponse>(&format!("{} WHERE u.id = ?", USER_VIEW_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(view)
    }

    async fn search_by_email(&self, fragment: &str, limit: i64) -> Result<Vec<UserResponse>, ServiceError> {
        let pattern = format!("%{}%", fragment.to_lowercase());
        let users = sqlx::query_as::<_, UserResponse>(&format!(
            "{} WHERE LOWER(u.email) LIKE ? ORDER BY u.email LIMIT ?",
            USER_VIEW_SELECT
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn create(&self, user: NewUser<'_>) -> Result<User, ServiceError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now().naive_utc();

        let id = sqlx::query(
            "INSERT INTO users (email, password_hash, role, enabled, created_at) VALUES (?, ?, ?, 1, ?)",
        )
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(duplicate_email)?
        .last_insert_rowid();

        sqlx::query("INSERT INTO profiles (user_id, full_name, phone) VALUES (?, ?, ?)")
            .bind(id)
            .bind(user.full_name)
            .bind(user.phone)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(User {
            id,
            email: user.email.to_string(),
            password_hash: user.password_hash.to_string(),
            role: user.role,
            enabled: true,
            created_at: now,
        })
    }

    async fn update_password(&self, user_id: i64, password_hash: &str) -> Result<(), ServiceError> {
        sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_role(&self, user_id: i64, role: Role) -> Result<(), ServiceError> {
        sqlx::query("UPDATE users SET role = ? WHERE id = ?")
            .bind(role)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_profile(&self, user_id: i64, changes: &UpdateProfileRequest) -> Result<(), ServiceError> {
        // Absent fields keep their stored value
        sqlx::query(
            "UPDATE profiles SET full_name = COALESCE(?, full_name), phone = COALESCE(?, phone), \
             bio = COALESCE(?, bio), avatar_url = COALESCE(?, avatar_url) WHERE user_id = ?",
        )
        .bind(&changes.full_name)
        .bind(&changes.phone)
        .bind(&changes.bio)
        .bind(&changes.avatar_url)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
