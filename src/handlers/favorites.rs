use actix_web::{web, HttpRequest, HttpResponse, Result};
use utoipa;

use crate::auth::JwtManager;
use crate::middleware::auth::authenticate_request;
use crate::models::{CountResponse, PageQuery, ServiceError};
use crate::services::FavoriteService;

#[utoipa::path(
    get,
    path = "/api/favorites",
    tag = "favorites",
    params(PageQuery),
    responses(
        (status = 200, description = "Favorites, most recent first", body = FavoritePage),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn list_favorites(
    favorite_service: web::Data<FavoriteService>,
    paging: web::Query<PageQuery>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let page = favorite_service.page(user.id, &paging).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[utoipa::path(
    get,
    path = "/api/favorites/all",
    tag = "favorites",
    responses(
        (status = 200, description = "Every favorite of the caller", body = [FavoriteResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn all_favorites(
    favorite_service: web::Data<FavoriteService>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let favorites = favorite_service.all(user.id).await?;
    Ok(HttpResponse::Ok().json(favorites))
}

#[utoipa::path(
    get,
    path = "/api/favorites/ids",
    tag = "favorites",
    responses(
        (status = 200, description = "Business IDs the caller marked as favorite", body = [i64]),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn favorite_ids(
    favorite_service: web::Data<FavoriteService>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let ids = favorite_service.ids(user.id).await?;
    Ok(HttpResponse::Ok().json(ids))
}

#[utoipa::path(
    get,
    path = "/api/favorites/count",
    tag = "favorites",
    responses(
        (status = 200, description = "Number of favorites", body = CountResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn count_favorites(
    favorite_service: web::Data<FavoriteService>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let count = favorite_service.count(user.id).await?;
    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

#[utoipa::path(
    get,
    path = "/api/favorites/check/{business_id}",
    tag = "favorites",
    params(
        ("business_id" = i64, Path, description = "Business ID")
    ),
    responses(
        (status = 200, description = "Whether the business is a favorite", body = FavoriteCheckResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn check_favorite(
    favorite_service: web::Data<FavoriteService>,
    path: web::Path<i64>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let check = favorite_service.check(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(check))
}

#[utoipa::path(
    post,
    path = "/api/favorites/{business_id}",
    tag = "favorites",
    params(
        ("business_id" = i64, Path, description = "Business ID")
    ),
    responses(
        (status = 200, description = "Business is a favorite", body = FavoriteCheckResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    )
)]
pub async fn add_favorite(
    favorite_service: web::Data<FavoriteService>,
    path: web::Path<i64>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let check = favorite_service.add(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(check))
}

#[utoipa::path(
    delete,
    path = "/api/favorites/{business_id}",
    tag = "favorites",
    params(
        ("business_id" = i64, Path, description = "Business ID")
    ),
    responses(
        (status = 204, description = "Favorite removed"),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn remove_favorite(
    favorite_service: web::Data<FavoriteService>,
    path: web::Path<i64>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    favorite_service.remove(user.id, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    post,
    path = "/api/favorites/{business_id}/toggle",
    tag = "favorites",
    params(
        ("business_id" = i64, Path, description = "Business ID")
    ),
    responses(
        (status = 200, description = "New favorite state", body = FavoriteCheckResponse),
        (status = 404, description = "Business not found", body = ErrorResponse)
    )
)]
pub async fn toggle_favorite(
    favorite_service: web::Data<FavoriteService>,
    path: web::Path<i64>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    let check = favorite_service.toggle(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(check))
}
