use actix_web::{web, HttpRequest, HttpResponse, Result};
use utoipa;
use validator::Validate;

use crate::auth::JwtManager;
use crate::middleware::auth::authenticate_request;
use crate::models::{
    BusinessSearchQuery, CreateBusinessRequest, Role, ServiceError, UpdateBusinessRequest,
};
use crate::services::BusinessService;

#[utoipa::path(
    get,
    path = "/api/businesses/search",
    tag = "businesses",
    params(BusinessSearchQuery),
    responses(
        (status = 200, description = "Active businesses, best rated first", body = BusinessPage)
    ),
    security()
)]
pub async fn search_businesses(
    business_service: web::Data<BusinessService>,
    query: web::Query<BusinessSearchQuery>,
) -> Result<HttpResponse, ServiceError> {
    let page = business_service.search(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    get,
    path = "/api/businesses/categories",
    tag = "businesses",
    responses(
        (status = 200, description = "Every business category with its display label", body = [CategoryResponse])
    ),
    security()
)]
pub async fn list_categories(
    business_service: web::Data<BusinessService>,
) -> Result<HttpResponse, ServiceError> {
    Ok(HttpResponse::Ok().json(business_service.categories()))
}

#[utoipa::path(
    get,
    path = "/api/businesses/my",
    tag = "businesses",
    responses(
        (status = 200, description = "Active businesses owned by the caller", body = [BusinessSummary]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not an owner", body = ErrorResponse)
    )
)]
pub async fn my_businesses(
    business_service: web::Data<BusinessService>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;

    let businesses = business_service.my_businesses(user.id).await?;
    Ok(HttpResponse::Ok().json(businesses))
}

#[utoipa::path(
    post,
    path = "/api/businesses",
    tag = "businesses",
    request_body = CreateBusinessRequest,
    responses(
        (status = 201, description = "Business created", body = BusinessSummary),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not an owner", body = ErrorResponse)
    )
)]
pub async fn create_business(
    business_service: web::Data<BusinessService>,
    form: web::Json<CreateBusinessRequest>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;
    form.validate()?;

    let business = business_service.create(user.id, &form).await?;
    Ok(HttpResponse::Created().json(business))
}

#[utoipa::path(
    get,
    path = "/api/businesses/{id}",
    tag = "businesses",
    params(
        ("id" = i64, Path, description = "Business ID")
    ),
    responses(
        (status = 200, description = "Business with services, workers and gallery", body = BusinessDetailResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security()
)]
pub async fn get_business(
    business_service: web::Data<BusinessService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let detail = business_service.get_detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(detail))
}

#[utoipa::path(
    put,
    path = "/api/businesses/{id}",
    tag = "businesses",
    params(
        ("id" = i64, Path, description = "Business ID")
    ),
    request_body = UpdateBusinessRequest,
    responses(
        (status = 200, description = "Business updated", body = BusinessSummary),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    )
)]
pub async fn update_business(
    business_service: web::Data<BusinessService>,
    path: web::Path<i64>,
    form: web::Json<UpdateBusinessRequest>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;
    form.validate()?;

    let business = business_service
        .update(path.into_inner(), user.id, &form)
        .await?;
    Ok(HttpResponse::Ok().json(business))
}

#[utoipa::path(
    delete,
    path = "/api/businesses/{id}",
    tag = "businesses",
    params(
        ("id" = i64, Path, description = "Business ID")
    ),
    responses(
        (status = 204, description = "Business deactivated"),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    )
)]
pub async fn delete_business(
    business_service: web::Data<BusinessService>,
    path: web::Path<i64>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;

    business_service.delete(path.into_inner(), user.id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/reviews",
    tag = "businesses",
    params(
        ("id" = i64, Path, description = "Business ID")
    ),
    responses(
        (status = 200, description = "Reviews, newest first", body = [ReviewResponse]),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security()
)]
pub async fn list_reviews(
    business_service: web::Data<BusinessService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let reviews = business_service.reviews(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(reviews))
}
