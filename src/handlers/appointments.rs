use actix_web::{web, HttpRequest, HttpResponse, Result};
use utoipa;
use validator::Validate;

use crate::auth::JwtManager;
use crate::middleware::auth::authenticate_request;
use crate::models::{
    AvailabilityQuery, CancelQuery, CreateAppointmentRequest, CreateReviewRequest, PageQuery,
    ServiceError, UpdateAppointmentStatusRequest,
};
use crate::services::AppointmentService;

#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment booked as PENDING", body = AppointmentResponse),
        (status = 400, description = "Invalid time, inactive service or outside working hours", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Worker or service not found", body = ErrorResponse),
        (status = 409, description = "Slot already taken", body = ErrorResponse)
    )
)]
pub async fn create_appointment(
    appointment_service: web::Data<AppointmentService>,
    form: web::Json<CreateAppointmentRequest>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    form.validate()?;

    let appointment = appointment_service.create(&user, &form).await?;
    Ok(HttpResponse::Created().json(appointment))
}

#[utoipa::path(
    get,
    path = "/api/appointments/my",
    tag = "appointments",
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's appointments, newest first", body = AppointmentPage),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn my_appointments(
    appointment_service: web::Data<AppointmentService>,
    paging: web::Query<PageQuery>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let page = appointment_service.my_appointments(&user, &paging).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    get,
    path = "/api/appointments/my/upcoming",
    tag = "appointments",
    responses(
        (status = 200, description = "Pending and confirmed appointments ahead, soonest first", body = [AppointmentResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn my_upcoming(
    appointment_service: web::Data<AppointmentService>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let appointments = appointment_service.my_upcoming(&user).await?;
    Ok(HttpResponse::Ok().json(appointments))
}

#[utoipa::path(
    get,
    path = "/api/appointments/worker/{worker_id}",
    tag = "appointments",
    params(
        ("worker_id" = i64, Path, description = "Worker ID"),
        PageQuery
    ),
    responses(
        (status = 200, description = "Worker's appointments, newest first", body = AppointmentPage),
        (status = 403, description = "Caller is neither the worker nor the owner", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    )
)]
pub async fn worker_appointments(
    appointment_service: web::Data<AppointmentService>,
    path: web::Path<i64>,
    paging: web::Query<PageQuery>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let page = appointment_service
        .worker_appointments(path.into_inner(), &user, &paging)
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    get,
    path = "/api/appointments/worker/{worker_id}/upcoming",
    tag = "appointments",
    params(
        ("worker_id" = i64, Path, description = "Worker ID")
    ),
    responses(
        (status = 200, description = "Worker's upcoming appointments", body = [AppointmentResponse]),
        (status = 403, description = "Caller is neither the worker nor the owner", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    )
)]
pub async fn worker_upcoming(
    appointment_service: web::Data<AppointmentService>,
    path: web::Path<i64>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let appointments = appointment_service
        .worker_upcoming(path.into_inner(), &user)
        .await?;
    Ok(HttpResponse::Ok().json(appointments))
}

#[utoipa::path(
    get,
    path = "/api/appointments/availability/{worker_id}",
    tag = "appointments",
    params(
        ("worker_id" = i64, Path, description = "Worker ID"),
        AvailabilityQuery
    ),
    responses(
        (status = 200, description = "Candidate start times for the day", body = AvailabilityResponse),
        (status = 400, description = "Invalid date or duration", body = ErrorResponse),
        (status = 404, description = "Worker not found", body = ErrorResponse)
    ),
    security()
)]
pub async fn get_availability(
    appointment_service: web::Data<AppointmentService>,
    path: web::Path<i64>,
    query: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse, ServiceError> {
    let availability = appointment_service
        .availability(path.into_inner(), query.date, query.duration)
        .await?;
    Ok(HttpResponse::Ok().json(availability))
}

#[utoipa::path(
    get,
    path = "/api/appointments/{id}",
    tag = "appointments",
    params(
        ("id" = i64, Path, description = "Appointment ID")
    ),
    responses(
        (status = 200, description = "Appointment found", body = AppointmentResponse),
        (status = 403, description = "Caller is not a participant", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse)
    )
)]
pub async fn get_appointment(
    appointment_service: web::Data<AppointmentService>,
    path: web::Path<i64>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let appointment = appointment_service.get(path.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(appointment))
}

#[utoipa::path(
    patch,
    path = "/api/appointments/{id}",
    tag = "appointments",
    params(
        ("id" = i64, Path, description = "Appointment ID")
    ),
    request_body = UpdateAppointmentStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = AppointmentResponse),
        (status = 400, description = "Transition not allowed", body = ErrorResponse),
        (status = 403, description = "Caller may not make this change", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse)
    )
)]
pub async fn update_status(
    appointment_service: web::Data<AppointmentService>,
    path: web::Path<i64>,
    form: web::Json<UpdateAppointmentStatusRequest>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    form.validate()?;

    let appointment = appointment_service
        .update_status(path.into_inner(), &user, &form)
        .await?;
    Ok(HttpResponse::Ok().json(appointment))
}

#[utoipa::path(
    post,
    path = "/api/appointments/{id}/cancel",
    tag = "appointments",
    params(
        ("id" = i64, Path, description = "Appointment ID"),
        CancelQuery
    ),
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentResponse),
        (status = 400, description = "Appointment already finished", body = ErrorResponse),
        (status = 403, description = "Caller is not a participant", body = ErrorResponse),
        (status = 404, description = "Appointment not found", body = ErrorResponse)
    )
)]
pub async fn cancel_appointment(
    appointment_service: web::Data<AppointmentService>,
    path: web::Path<i64>,
    query: web::Query<CancelQuery>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let appointment = appointment_service
        .cancel(path.into_inner(), &user, query.reason.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(appointment))
}

#[utoipa::path(
    post,
    path = "/api/appointments/{id}/review",
    tag = "appointments",
    params(
        ("id" = i64, Path, description = "Appointment ID")
    ),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review stored", body = ReviewResponse),
        (status = 400, description = "Appointment not completed or invalid rating", body = ErrorResponse),
        (status = 403, description = "Caller is not the client", body = ErrorResponse),
        (status = 409, description = "Appointment already reviewed", body = ErrorResponse)
    )
)]
pub async fn create_review(
    appointment_service: web::Data<AppointmentService>,
    path: web::Path<i64>,
    form: web::Json<CreateReviewRequest>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    form.validate()?;

    let review = appointment_service
        .create_review(path.into_inner(), &user, &form)
        .await?;
    Ok(HttpResponse::Created().json(review))
}
