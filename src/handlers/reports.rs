use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use utoipa;

use crate::auth::JwtManager;
use crate::middleware::auth::authenticate_request;
use crate::models::{ReportQuery, Role, ServiceError};
use crate::services::ReportService;

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/reports",
    tag = "reports",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Appointment statistics for the range", body = BusinessReport),
        (status = 400, description = "Start date after end date", body = ErrorResponse),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse)
    )
)]
pub async fn business_report(
    report_service: web::Data<ReportService>,
    path: web::Path<i64>,
    query: web::Query<ReportQuery>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;

    let report = report_service
        .business_report(path.into_inner(), user.id, &query)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/reports/export",
    tag = "reports",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ReportQuery
    ),
    responses(
        (status = 200, description = "Per-service, per-worker and per-weekday tables", content_type = "text/csv", body = String),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse)
    )
)]
pub async fn export_report(
    report_service: web::Data<ReportService>,
    path: web::Path<i64>,
    query: web::Query<ReportQuery>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;

    let business_id = path.into_inner();
    let csv = report_service.export_csv(business_id, user.id, &query).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"report-{}.csv\"", business_id),
        ))
        .body(csv))
}
