use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::domain::AppointmentStatus;

/// One appointment flattened with the names and price needed for reporting.
#[derive(Debug, Clone, FromRow)]
pub struct ReportRow {
    pub worker_id: i64,
    pub worker_name: String,
    pub service_id: i64,
    pub service_name: String,
    pub price: f64,
    pub start_time: NaiveDateTime,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusCount {
    pub status: AppointmentStatus,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WorkerReport {
    pub worker_id: i64,
    pub worker_name: String,
    pub appointments: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServiceReport {
    pub service_id: i64,
    pub service_name: String,
    pub appointments: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeekdayReport {
    /// 0 = Sunday .. 6 = Saturday
    pub day_of_week: i64,
    pub day_name: String,
    pub appointments: i64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BusinessReport {
    pub business_id: i64,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub total_appointments: i64,
    pub total_revenue: f64,
    pub status_counts: Vec<StatusCount>,
    pub workers: Vec<WorkerReport>,
    pub services: Vec<ServiceReport>,
    pub weekdays: Vec<WeekdayReport>,
}
