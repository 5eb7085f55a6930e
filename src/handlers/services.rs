use actix_web::{web, HttpRequest, HttpResponse, Result};
use utoipa;
use validator::Validate;

use crate::auth::JwtManager;
use crate::middleware::auth::authenticate_request;
use crate::models::{CreateServiceRequest, Role, ServiceError, UpdateServiceRequest};
use crate::services::CatalogService;

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/services",
    tag = "services",
    params(
        ("id" = i64, Path, description = "Business ID")
    ),
    responses(
        (status = 200, description = "Active services of the business", body = [ServiceOffering]),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security()
)]
pub async fn list_services(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let services = catalog_service.list(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(services))
}

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/services/{service_id}",
    tag = "services",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("service_id" = i64, Path, description = "Service ID")
    ),
    responses(
        (status = 200, description = "Service found", body = ServiceOffering),
        (status = 404, description = "Service not found", body = ErrorResponse)
    ),
    security()
)]
pub async fn get_service(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(i64, i64)>,
) -> Result<HttpResponse, ServiceError> {
    let (business_id, service_id) = path.into_inner();
    let service = catalog_service.get(business_id, service_id).await?;
    Ok(HttpResponse::Ok().json(service))
}

#[utoipa::path(
    post,
    path = "/api/businesses/{id}/services",
    tag = "services",
    params(
        ("id" = i64, Path, description = "Business ID")
    ),
    request_body = CreateServiceRequest,
    responses(
        (status = 201, description = "Service created", body = ServiceOffering),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse)
    )
)]
pub async fn create_service(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<i64>,
    form: web::Json<CreateServiceRequest>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;
    form.validate()?;

    let service = catalog_service
        .create(path.into_inner(), user.id, &form)
        .await?;
    Ok(HttpResponse::Created().json(service))
}

#[utoipa::path(
    put,
    path = "/api/businesses/{id}/services/{service_id}",
    tag = "services",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("service_id" = i64, Path, description = "Service ID")
    ),
    request_body = UpdateServiceRequest,
    responses(
        (status = 200, description = "Service updated", body = ServiceOffering),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse),
        (status = 404, description = "Service not found", body = ErrorResponse)
    )
)]
pub async fn update_service(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(i64, i64)>,
    form: web::Json<UpdateServiceRequest>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;
    form.validate()?;

    let (business_id, service_id) = path.into_inner();
    let service = catalog_service
        .update(business_id, service_id, user.id, &form)
        .await?;
    Ok(HttpResponse::Ok().json(service))
}

#[utoipa::path(
    delete,
    path = "/api/businesses/{id}/services/{service_id}",
    tag = "services",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("service_id" = i64, Path, description = "Service ID")
    ),
    responses(
        (status = 204, description = "Service deactivated"),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse),
        (status = 404, description = "Service not found", body = ErrorResponse)
    )
)]
pub async fn delete_service(
    catalog_service: web::Data<CatalogService>,
    path: web::Path<(i64, i64)>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;

    let (business_id, service_id) = path.into_inner();
    catalog_service
        .delete(business_id, service_id, user.id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
