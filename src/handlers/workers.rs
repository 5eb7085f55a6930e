use actix_web::{web, HttpRequest, HttpResponse, Result};
use utoipa;
use validator::Validate;

use crate::auth::JwtManager;
use crate::middleware::auth::authenticate_request;
use crate::models::{AddWorkerRequest, Role, ScheduleEntryRequest, ServiceError, UpdateWorkerRequest};
use crate::services::WorkerService;

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/workers",
    tag = "workers",
    params(
        ("id" = i64, Path, description = "Business ID")
    ),
    responses(
        (status = 200, description = "Active workers with their weekly schedule", body = [WorkerResponse]),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security()
)]
pub async fn list_workers(
    worker_service: web::Data<WorkerService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let workers = worker_service.list(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(workers))
}

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/workers/{worker_id}",
    tag = "workers",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("worker_id" = i64, Path, description = "Worker ID")
    ),
    responses(
        (status = 200, description = "Worker found", body = WorkerResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    ),
    security()
)]
pub async fn get_worker(
    worker_service: web::Data<WorkerService>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (business_id, worker_id) = path.into_inner();
    let worker = worker_service.get(business_id, worker_id).await?;
    Ok(HttpResponse::Ok().json(worker))
}

#[utoipa::path(
    post,
    path = "/api/businesses/{id}/workers",
    tag = "workers",
    params(
        ("id" = i64, Path, description = "Business ID")
    ),
    request_body = AddWorkerRequest,
    responses(
        (status = 201, description = "Worker added", body = WorkerResponse),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse),
        (status = 404, description = "No user with that email", body = ErrorResponse),
        (status = 409, description = "User already works there", body = ErrorResponse)
    )
)]
pub async fn add_worker(
    worker_service: web::Data<WorkerService>,
    path: web::Path<i64>,
    form: web::Json<AddWorkerRequest>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;
    form.validate()?;

    let worker = worker_service.add(path.into_inner(), user.id, &form).await?;
    Ok(HttpResponse::Created().json(worker))
}

#[utoipa::path(
    put,
    path = "/api/businesses/{id}/workers/{worker_id}",
    tag = "workers",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("worker_id" = i64, Path, description = "Worker ID")
    ),
    request_body = UpdateWorkerRequest,
    responses(
        (status = 200, description = "Worker updated", body = WorkerResponse),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    )
)]
pub async fn update_worker(
    worker_service: web::Data<WorkerService>,
    path: web::Path<(i64, i64)>,
    form: web::Json<UpdateWorkerRequest>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;
    form.validate()?;

    let (business_id, worker_id) = path.into_inner();
    let worker = worker_service
        .update(business_id, worker_id, user.id, &form)
        .await?;
    Ok(HttpResponse::Ok().json(worker))
}

#[utoipa::path(
    delete,
    path = "/api/businesses/{id}/workers/{worker_id}",
    tag = "workers",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("worker_id" = i64, Path, description = "Worker ID")
    ),
    responses(
        (status = 204, description = "Worker deactivated"),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    )
)]
pub async fn remove_worker(
    worker_service: web::Data<WorkerService>,
    path: web::Path<(i64, i64)>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;

    let (business_id, worker_id) = path.into_inner();
    worker_service.remove(business_id, worker_id, user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    put,
    path = "/api/businesses/{id}/workers/{worker_id}/schedule",
    tag = "workers",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("worker_id" = i64, Path, description = "Worker ID")
    ),
    request_body = Vec<ScheduleEntryRequest>,
    responses(
        (status = 200, description = "Weekly schedule replaced", body = WorkerResponse),
        (status = 400, description = "Invalid schedule", body = ErrorResponse),
        (status = 403, description = "Caller is neither the owner nor the worker", body = ErrorResponse)
    )
)]
pub async fn update_schedule(
    worker_service: web::Data<WorkerService>,
    path: web::Path<(i64, i64)>,
    entries: web::Json<Vec<ScheduleEntryRequest>>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner, Role::Worker])?;

    let (business_id, worker_id) = path.into_inner();
    let worker = worker_service
        .update_schedule(business_id, worker_id, &user, &entries)
        .await?;
    Ok(HttpResponse::Ok().json(worker))
}

#[utoipa::path(
    get,
    path = "/api/workers/me",
    tag = "workers",
    responses(
        (status = 200, description = "Worker records of the caller", body = [WorkerResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not a worker", body = ErrorResponse)
    )
)]
pub async fn my_worker_records(
    worker_service: web::Data<WorkerService>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Worker])?;

    let workers = worker_service.my_workers(user.id).await?;
    Ok(HttpResponse::Ok().json(workers))
}
