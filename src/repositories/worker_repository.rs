use crate::models::{ScheduleEntryRequest, ServiceError, Worker, WorkerProfileRow, WorkerSchedule};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

const WORKER_COLUMNS: &str = "id, user_id, business_id, position, active, created_at";

const WORKER_PROFILE_SELECT: &str = "SELECT w.id, w.user_id, w.business_id, b.name AS business_name, \
     p.full_name, u.email, p.avatar_url, w.position, w.active \
     FROM workers w \
     JOIN users u ON u.id = w.user_id \
     JOIN profiles p ON p.user_id = w.user_id \
     JOIN businesses b ON b.id = w.business_id";

#[async_trait]
pub trait WorkerRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Worker>, ServiceError>;
    async fn find_by_user_and_business(&self, user_id: i64, business_id: i64) -> Result<Option<Worker>, ServiceError>;
    async fn find_profile(&self, id: i64) -> Result<Option<WorkerProfileRow>, ServiceError>;
    async fn list_active_profiles(&self, business_id: i64) -> Result<Vec<WorkerProfileRow>, ServiceError>;
    async fn list_profiles_for_user(&self, user_id: i64) -> Result<Vec<WorkerProfileRow>, ServiceError>;
    async fn create(&self, user_id: i64, business_id: i64, position: Option<&str>) -> Result<i64, ServiceError>;
    async fn update(&self, id: i64, position: Option<&str>, active: Option<bool>) -> Result<(), ServiceError>;

    async fn list_schedules(&self, worker_id: i64) -> Result<Vec<WorkerSchedule>, ServiceError>;
    async fn find_schedule_for_day(&self, worker_id: i64, day_of_week: i64) -> Result<Option<WorkerSchedule>, ServiceError>;
    /// Replaces the whole weekly schedule atomically.
    async fn replace_schedules(&self, worker_id: i64, entries: &[ScheduleEntryRequest]) -> Result<(), ServiceError>;
}

pub struct SqliteWorkerRepository {
    pool: SqlitePool,
}

impl SqliteWorkerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WorkerRepository for SqliteWorkerRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Worker>, ServiceError> {
        let worker = sqlx::query_as::<_, Worker>(&format!("SELECT {} FROM workers WHERE id = ?", WORKER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(worker)
    }

    async fn find_by_user_and_business(&self, user_id: i64, business_id: i64) -> Result<Option<Worker>, ServiceError> {
        let worker = sqlx::query_as::<_, Worker>(&format!(
            "SELECT {} FROM workers WHERE user_id = ? AND business_id = ?",
            WORKER_COLUMNS
        ))
        .bind(user_id)
        .bind(business_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(worker)
    }

    async fn find_profile(&self, id: i64) -> Result<Option<WorkerProfileRow>, ServiceError> {
        let row = sqlx::query_as::<_, WorkerProfileRow>(&format!("{} WHERE w.id = ?", WORKER_PROFILE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn list_active_profiles(&self, business_id: i64) -> Result<Vec<WorkerProfileRow>, ServiceError> {
        let rows = sqlx::query_as::<_, WorkerProfileRow>(&format!(
            "{} WHERE w.business_id = ? AND w.active = 1 ORDER BY p.full_name, w.id",
            WORKER_PROFILE_SELECT
        ))
        .bind(business_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn list_profiles_for_user(&self, user_id: i64) -> Result<Vec<WorkerProfileRow>, ServiceError> {
        let rows = sqlx::query_as::<_, WorkerProfileRow>(&format!(
            "{} WHERE w.user_id = ? AND w.active = 1 AND b.active = 1 ORDER BY b.name, w.id",
            WORKER_PROFILE_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn create(&self, user_id: i64, business_id: i64, position: Option<&str>) -> Result<i64, ServiceError> {
        let id = sqlx::query(
            "INSERT INTO workers (user_id, business_id, position, active, created_at) VALUES (?, ?, ?, 1, ?)",
        )
        .bind(user_id)
        .bind(business_id)
        .bind(position)
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    async fn update(&self, id: i64, position: Option<&str>, active: Option<bool>) -> Result<(), ServiceError> {
        sqlx::query("UPDATE workers SET position = COALESCE(?, position), active = COALESCE(?, active) WHERE id = ?")
            .bind(position)
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn list_schedules(&self, worker_id: i64) -> Result<Vec<WorkerSchedule>, ServiceError> {
        let schedules = sqlx::query_as::<_, WorkerSchedule>(
            "SELECT id, worker_id, day_of_week, start_time, end_time, is_available FROM worker_schedules \
             WHERE worker_id = ? ORDER BY day_of_week",
        )
        .bind(worker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(schedules)
    }

    async fn find_schedule_for_day(&self, worker_id: i64, day_of_week: i64) -> Result<Option<WorkerSchedule>, ServiceError> {
        let schedule = sqlx::query_as::<_, WorkerSchedule>(
            "SELECT id, worker_id, day_of_week, start_time, end_time, is_available FROM worker_schedules \
             WHERE worker_id = ? AND day_of_week = ?",
        )
        .bind(worker_id)
        .bind(day_of_week)
        .fetch_optional(&self.pool)
        .await?;

        Ok(schedule)
    }

    async fn replace_schedules(&self, worker_id: i64, entries: &[ScheduleEntryRequest]) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM worker_schedules WHERE worker_id = ?")
            .bind(worker_id)
            .execute(&mut *tx)
            .await?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO worker_schedules (worker_id, day_of_week, start_time, end_time, is_available) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(worker_id)
            .bind(entry.day_of_week)
            .bind(entry.start_time)
            .bind(entry.end_time)
            .bind(entry.is_available)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
