use actix_web::{web, HttpRequest, HttpResponse, Result};
use utoipa;
use validator::Validate;

use crate::auth::JwtManager;
use crate::middleware::auth::{authenticate_request, client_ip};
use crate::models::{
    ApiResponse, ForgotPasswordRequest, LoginRequest, RefreshTokenRequest, RegisterRequest,
    ResetPasswordRequest, ServiceError, TokenQuery,
};
use crate::services::{AuthService, RateLimitService};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created, tokens issued", body = AuthResponse),
        (status = 400, description = "Invalid input or email already registered", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    security()
)]
pub async fn register(
    auth_service: web::Data<AuthService>,
    rate_limits: web::Data<RateLimitService>,
    form: web::Json<RegisterRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    rate_limits.check_general(&client_ip(&req))?;
    form.validate()?;

    let response = auth_service.register(&form).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 429, description = "Too many login attempts", body = ErrorResponse)
    ),
    security()
)]
pub async fn login(
    auth_service: web::Data<AuthService>,
    rate_limits: web::Data<RateLimitService>,
    form: web::Json<LoginRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let key = RateLimitService::login_key(&client_ip(&req), &form.email);
    rate_limits.check_login(&key)?;
    form.validate()?;

    let response = auth_service.login(&form).await?;
    rate_limits.reset_login(&key);

    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/refresh",
    tag = "auth",
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "New token pair issued", body = AuthResponse),
        (status = 401, description = "Refresh token invalid or expired", body = ErrorResponse)
    ),
    security()
)]
pub async fn refresh(
    auth_service: web::Data<AuthService>,
    form: web::Json<RefreshTokenRequest>,
) -> Result<HttpResponse, ServiceError> {
    form.validate()?;
    let response = auth_service.refresh(&form.refresh_token).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "All sessions closed", body = ApiResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    )
)]
pub async fn logout(
    auth_service: web::Data<AuthService>,
    req: HttpRequest,
    jwt_manager: web::Data<JwtManager>,
) -> Result<HttpResponse, ServiceError> {
    let user = authenticate_request(&req, &jwt_manager)?;
    auth_service.logout(user.id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Logged out successfully")))
}

#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    tag = "auth",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset email sent if the account exists", body = ForgotPasswordResponse),
        (status = 429, description = "Too many reset requests", body = ErrorResponse)
    ),
    security()
)]
pub async fn forgot_password(
    auth_service: web::Data<AuthService>,
    rate_limits: web::Data<RateLimitService>,
    form: web::Json<ForgotPasswordRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    let key = RateLimitService::login_key(&client_ip(&req), &form.email);
    rate_limits.check_password_reset(&key)?;
    form.validate()?;

    let response = auth_service.forgot_password(&form.email).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[utoipa::path(
    get,
    path = "/api/auth/validate-reset-token",
    tag = "auth",
    params(TokenQuery),
    responses(
        (status = 200, description = "Token is valid", body = ApiResponse),
        (status = 400, description = "Token is invalid, used or expired", body = ErrorResponse)
    ),
    security()
)]
pub async fn validate_reset_token(
    auth_service: web::Data<AuthService>,
    query: web::Query<TokenQuery>,
) -> Result<HttpResponse, ServiceError> {
    auth_service.validate_reset_token(&query.token).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Token is valid")))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    tag = "auth",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = ApiResponse),
        (status = 400, description = "Token is invalid, used or expired", body = ErrorResponse),
        (status = 429, description = "Too many requests", body = ErrorResponse)
    ),
    security()
)]
pub async fn reset_password(
    auth_service: web::Data<AuthService>,
    rate_limits: web::Data<RateLimitService>,
    form: web::Json<ResetPasswordRequest>,
    req: HttpRequest,
) -> Result<HttpResponse, ServiceError> {
    rate_limits.check_general(&client_ip(&req))?;
    form.validate()?;

    auth_service.reset_password(&form.token, &form.new_password).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok("Password has been reset successfully")))
}
