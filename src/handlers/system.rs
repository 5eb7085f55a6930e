use actix_web::{web, HttpResponse, Result};
use serde_json;
use sqlx::SqlitePool;
use utoipa;

use crate::models::ServiceError;
use crate::scheduler::BackgroundScheduler;

#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is up and the database answers"),
        (status = 500, description = "Database unreachable", body = ErrorResponse)
    ),
    security()
)]
pub async fn health(
    pool: web::Data<SqlitePool>,
    scheduler: web::Data<BackgroundScheduler>,
) -> Result<HttpResponse, ServiceError> {
    sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "UP",
        "database": "UP",
        "scheduler_running": scheduler.is_running().await,
        "timestamp": chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
    })))
}
