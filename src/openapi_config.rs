use std::collections::BTreeMap;

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityRequirement, SecurityScheme};
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HairHub API",
        description = "Booking backend for barbershops, salons and other appointment based businesses"
    ),
    paths(
        handlers::system::health,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::auth::forgot_password,
        handlers::auth::validate_reset_token,
        handlers::auth::reset_password,
        handlers::users::get_me,
        handlers::users::update_me,
        handlers::users::change_password,
        handlers::users::search_users,
        handlers::users::get_user,
        handlers::businesses::search_businesses,
        handlers::businesses::list_categories,
        handlers::businesses::my_businesses,
        handlers::businesses::create_business,
        handlers::businesses::get_business,
        handlers::businesses::update_business,
        handlers::businesses::delete_business,
        handlers::businesses::list_reviews,
        handlers::services::list_services,
        handlers::services::get_service,
        handlers::services::create_service,
        handlers::services::update_service,
        handlers::services::delete_service,
        handlers::workers::list_workers,
        handlers::workers::get_worker,
        handlers::workers::add_worker,
        handlers::workers::update_worker,
        handlers::workers::remove_worker,
        handlers::workers::update_schedule,
        handlers::workers::my_worker_records,
        handlers::images::list_images,
        handlers::images::add_image,
        handlers::images::remove_image,
        handlers::reports::business_report,
        handlers::reports::export_report,
        handlers::appointments::create_appointment,
        handlers::appointments::my_appointments,
        handlers::appointments::my_upcoming,
        handlers::appointments::worker_appointments,
        handlers::appointments::worker_upcoming,
        handlers::appointments::get_availability,
        handlers::appointments::get_appointment,
        handlers::appointments::update_status,
        handlers::appointments::cancel_appointment,
        handlers::appointments::create_review,
        handlers::favorites::list_favorites,
        handlers::favorites::all_favorites,
        handlers::favorites::favorite_ids,
        handlers::favorites::count_favorites,
        handlers::favorites::check_favorite,
        handlers::favorites::add_favorite,
        handlers::favorites::remove_favorite,
        handlers::favorites::toggle_favorite,
    ),
    components(schemas(
        models::Role,
        models::BusinessCategory,
        models::AppointmentStatus,
        models::Business,
        models::BusinessImage,
        models::ServiceOffering,
        models::RegisterRequest,
        models::LoginRequest,
        models::RefreshTokenRequest,
        models::ForgotPasswordRequest,
        models::ResetPasswordRequest,
        models::ChangePasswordRequest,
        models::UpdateProfileRequest,
        models::CreateBusinessRequest,
        models::UpdateBusinessRequest,
        models::AddImageRequest,
        models::CreateServiceRequest,
        models::UpdateServiceRequest,
        models::AddWorkerRequest,
        models::UpdateWorkerRequest,
        models::ScheduleEntryRequest,
        models::CreateAppointmentRequest,
        models::UpdateAppointmentStatusRequest,
        models::CreateReviewRequest,
        models::ApiResponse,
        models::ErrorResponse,
        models::AuthResponse,
        models::ForgotPasswordResponse,
        models::UserResponse,
        models::CategoryResponse,
        models::BusinessSummary,
        models::BusinessDetailResponse,
        models::ScheduleResponse,
        models::WorkerResponse,
        models::AppointmentResponse,
        models::ReviewResponse,
        models::FavoriteResponse,
        models::FavoriteCheckResponse,
        models::CountResponse,
        models::BusinessPage,
        models::AppointmentPage,
        models::FavoritePage,
        models::TimeSlot,
        models::AvailabilityResponse,
        models::StatusCount,
        models::WorkerReport,
        models::ServiceReport,
        models::WeekdayReport,
        models::BusinessReport,
    )),
    tags(
        (name = "auth", description = "Registration, login and password recovery"),
        (name = "users", description = "Profiles"),
        (name = "businesses", description = "Business directory"),
        (name = "services", description = "Bookable services of a business"),
        (name = "workers", description = "Staff and weekly schedules"),
        (name = "images", description = "Business gallery"),
        (name = "appointments", description = "Booking, status changes and reviews"),
        (name = "favorites", description = "Saved businesses"),
        (name = "reports", description = "Owner statistics"),
        (name = "system", description = "Health")
    )
)]
pub struct ApiDoc;

pub fn configure_openapi(mut openapi: OpenApiSpec) -> OpenApiSpec {
    let mut security_schemes = BTreeMap::new();
    security_schemes.insert(
        "bearer_auth".to_string(),
        SecurityScheme::Http(
            HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .description(Some("Access token from /api/auth/login"))
                .build(),
        ),
    );

    if let Some(components) = openapi.components.as_mut() {
        components.security_schemes = security_schemes;
    }

    // Endpoints opt out with `security()`
    openapi.security = Some(vec![SecurityRequirement::new(
        "bearer_auth",
        Vec::<String>::new(),
    )]);

    openapi
}
