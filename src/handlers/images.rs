use actix_web::{web, HttpRequest, HttpResponse, Result};
use utoipa;
use validator::Validate;

use crate::auth::JwtManager;
use crate::middleware::auth::authenticate_request;
use crate::models::{AddImageRequest, Role, ServiceError};
use crate::services::BusinessService;

#[utoipa::path(
    get,
    path = "/api/businesses/{id}/images",
    tag = "images",
    params(
        ("id" = i64, Path, description = "Business ID")
    ),
    responses(
        (status = 200, description = "Gallery in display order", body = [BusinessImage]),
        (status = 404, description = "Business not found", body = ErrorResponse)
    ),
    security()
)]
pub async fn list_images(
    business_service: web::Data<BusinessService>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ServiceError> {
    let images = business_service.images(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(images))
}

#[utoipa::path(
    post,
    path = "/api/businesses/{id}/images",
    tag = "images",
    params(
        ("id" = i64, Path, description = "Business ID")
    ),
    request_body = AddImageRequest,
    responses(
        (status = 201, description = "Image appended to the gallery", body = BusinessImage),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse)
    )
)]
pub async fn add_image(
    business_service: web::Data<BusinessService>,
    path: web::Path<i64>,
    form: web::Json<AddImageRequest>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;
    form.validate()?;

    let image = business_service
        .add_image(path.into_inner(), user.id, &form)
        .await?;
    Ok(HttpResponse::Created().json(image))
}

#[utoipa::path(
    delete,
    path = "/api/businesses/{id}/images/{image_id}",
    tag = "images",
    params(
        ("id" = i64, Path, description = "Business ID"),
        ("image_id" = i64, Path, description = "Image ID")
    ),
    responses(
        (status = 204, description = "Image removed"),
        (status = 403, description = "Caller does not own the business", body = ErrorResponse),
        (status = 404, description = "Image not found", body = ErrorResponse)
    )
)]
pub async fn remove_image(
    business_service: web::Data<BusinessService>,
    path: web::Path<(i64, i64)>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    user.require_role(&[Role::Owner])?;

    let (business_id, image_id) = path.into_inner();
    business_service
        .remove_image(business_id, image_id, user.id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
