use crate::models::{Appointment, AppointmentResponse, AppointmentStatus, ReportRow, ServiceError};
use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::SqlitePool;

const APPOINTMENT_COLUMNS: &str = "id, client_id, worker_id, service_id, start_time, end_time, status, \
     client_notes, cancellation_reason, created_at, updated_at";

const DETAIL_SELECT: &str = "SELECT a.id, a.client_id, cp.full_name AS client_name, cu.email AS client_email, \
     a.worker_id, wp.full_name AS worker_name, a.service_id, s.name AS service_name, s.price AS service_price, \
     s.duration_minutes, w.business_id, b.name AS business_name, a.start_time, a.end_time, a.status, \
     a.client_notes, a.cancellation_reason, \
     EXISTS(SELECT 1 FROM reviews r WHERE r.appointment_id = a.id) AS has_review, a.created_at \
     FROM appointments a \
     JOIN users cu ON cu.id = a.client_id \
     JOIN profiles cp ON cp.user_id = a.client_id \
     JOIN workers w ON w.id = a.worker_id \
     JOIN profiles wp ON wp.user_id = w.user_id \
     JOIN services s ON s.id = a.service_id \
     JOIN businesses b ON b.id = w.business_id";

// Statuses that still occupy the worker's time
const BLOCKING_STATUSES: &str = "a.status NOT IN ('CANCELLED', 'NO_SHOW')";
const UPCOMING_STATUSES: &str = "a.status IN ('PENDING', 'CONFIRMED')";

pub struct NewAppointment<'a> {
    pub client_id: i64,
    pub worker_id: i64,
    pub service_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub client_notes: Option<&'a str>,
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn create(&self, appointment: NewAppointment<'_>) -> Result<i64, ServiceError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, ServiceError>;
    async fn find_detail(&self, id: i64) -> Result<Option<AppointmentResponse>, ServiceError>;
    /// Appointments of a worker that hold time inside `[from, to)`.
    async fn find_blocking(&self, worker_id: i64, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<Appointment>, ServiceError>;
    async fn page_for_client(&self, client_id: i64, limit: i64, offset: i64) -> Result<(Vec<AppointmentResponse>, i64), ServiceError>;
    async fn upcoming_for_client(&self, client_id: i64, now: NaiveDateTime) -> Result<Vec<AppointmentResponse>, ServiceError>;
    async fn page_for_worker(&self, worker_id: i64, limit: i64, offset: i64) -> Result<(Vec<AppointmentResponse>, i64), ServiceError>;
    async fn upcoming_for_worker(&self, worker_id: i64, now: NaiveDateTime) -> Result<Vec<AppointmentResponse>, ServiceError>;
    async fn update_status(&self, id: i64, status: AppointmentStatus, cancellation_reason: Option<&str>) -> Result<(), ServiceError>;
    async fn report_rows(&self, business_id: i64, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Result<Vec<ReportRow>, ServiceError>;
}

pub struct SqliteAppointmentRepository {
    pool: SqlitePool,
}

impl SqliteAppointmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for SqliteAppointmentRepository {
    async fn create(&self, appointment: NewAppointment<'_>) -> Result<i64, ServiceError> {
        let now = Utc::now().naive_utc();
        let id = sqlx::query(
            "INSERT INTO appointments (client_id, worker_id, service_id, start_time, end_time, status, client_notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(appointment.client_id)
        .bind(appointment.worker_id)
        .bind(appointment.service_id)
        .bind(appointment.start_time)
        .bind(appointment.end_time)
        .bind(AppointmentStatus::Pending)
        .bind(appointment.client_notes)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Appointment>, ServiceError> {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {} FROM appointments WHERE id = ?",
            APPOINTMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(appointment)
    }

    async fn find_detail(&self, id: i64) -> Result<Option<AppointmentResponse>, ServiceError> {
        let detail = sqlx::query_as::<_, AppointmentResponse>(&format!("{} WHERE a.id = ?", DETAIL_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(detail)
    }

    async fn find_blocking(&self, worker_id: i64, from: NaiveDateTime, to: NaiveDateTime) -> Result<Vec<Appointment>, ServiceError> {
        let appointments = sqlx::query_as::<_, Appointment>(&format!(
            "SELECT {} FROM appointments a WHERE a.worker_id = ? AND {} AND a.start_time < ? AND a.end_time > ? \
             ORDER BY a.start_time",
            APPOINTMENT_COLUMNS, BLOCKING_STATUSES
        ))
        .bind(worker_id)
        .bind(to)
        .bind(from)
        .fetch_all(&self.pool)
        .await?;

        Ok(appointments)
    }

    async fn page_for_client(&self, client_id: i64, limit: i64, offset: i64) -> Result<(Vec<AppointmentResponse>, i64), ServiceError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments WHERE client_id = ?")
            .bind(client_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, AppointmentResponse>(&format!(
            "{} WHERE a.client_id = ? ORDER BY a.start_time DESC, a.id DESC LIMIT ? OFFSET ?",
            DETAIL_SELECT
        ))
        .bind(client_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    async fn upcoming_for_client(&self, client_id: i64, now: NaiveDateTime) -> Result<Vec<AppointmentResponse>, ServiceError> {
        let rows = sqlx::query_as::<_, AppointmentResponse>(&format!(
            "{} WHERE a.client_id = ? AND a.start_time >= ? AND {} ORDER BY a.start_time ASC, a.id ASC",
            DETAIL_SELECT, UPCOMING_STATUSES
        ))
        .bind(client_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn page_for_worker(&self, worker_id: i64, limit: i64, offset: i64) -> Result<(Vec<AppointmentResponse>, i64), ServiceError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments WHERE worker_id = ?")
            .bind(worker_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, AppointmentResponse>(&format!(
            "{} WHERE a.worker_id = ? ORDER BY a.start_time DESC, a.id DESC LIMIT ? OFFSET ?",
            DETAIL_SELECT
        ))
        .bind(worker_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((rows, total))
    }

    async fn upcoming_for_worker(&self, worker_id: i64, now: NaiveDateTime) -> Result<Vec<AppointmentResponse>, ServiceError> {
        let rows = sqlx::query_as::<_, AppointmentResponse>(&format!(
            "{} WHERE a.worker_id = ? AND a.start_time >= ? AND {} ORDER BY a.start_time ASC, a.id ASC",
            DETAIL_SELECT, UPCOMING_STATUSES
        ))
        .bind(worker_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn update_status(&self, id: i64, status: AppointmentStatus, cancellation_reason: Option<&str>) -> Result<(), ServiceError> {
        sqlx::query(
            "UPDATE appointments SET status = ?, cancellation_reason = COALESCE(?, cancellation_reason), updated_at = ? WHERE id = ?",
        )
        .bind(status)
        .bind(cancellation_reason)
        .bind(Utc::now().naive_utc())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn report_rows(&self, business_id: i64, from: Option<NaiveDateTime>, to: Option<NaiveDateTime>) -> Result<Vec<ReportRow>, ServiceError> {
        let rows = sqlx::query_as::<_, ReportRow>(
            "SELECT a.worker_id, wp.full_name AS worker_name, a.service_id, s.name AS service_name, \
             s.price, a.start_time, a.status \
             FROM appointments a \
             JOIN workers w ON w.id = a.worker_id \
             JOIN profiles wp ON wp.user_id = w.user_id \
             JOIN services s ON s.id = a.service_id \
             WHERE w.business_id = ? AND (? IS NULL OR a.start_time >= ?) AND (? IS NULL OR a.start_time < ?) \
             ORDER BY a.start_time",
        )
        .bind(business_id)
        .bind(from)
        .bind(from)
        .bind(to)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
