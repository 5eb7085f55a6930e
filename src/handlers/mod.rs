pub mod appointments;
pub mod auth;
pub mod businesses;
pub mod favorites;
pub mod images;
pub mod reports;
pub mod services;
pub mod system;
pub mod users;
pub mod workers;

// Re-export all handler functions for easy importing
pub use appointments::*;
pub use auth::*;
pub use businesses::*;
pub use favorites::*;
pub use images::*;
pub use reports::*;
pub use services::*;
pub use system::*;
pub use users::*;
pub use workers::*;

use actix_web::web;

use crate::models::ServiceError;

/// Registers every API route plus extractor error handlers that render
/// failures in the common error shape. Literal segments are registered
/// before the `{id}` routes that would otherwise swallow them.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ServiceError::ValidationError(format!("Invalid request body: {}", err)).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| {
        ServiceError::ValidationError(format!("Invalid query parameters: {}", err)).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        ServiceError::NotFound(format!("Invalid path: {}", err)).into()
    }));

    cfg
        // System
        .route("/api/health", web::get().to(health))
        // Authentication
        .route("/api/auth/register", web::post().to(register))
        .route("/api/auth/login", web::post().to(login))
        .route("/api/auth/refresh", web::post().to(refresh))
        .route("/api/auth/logout", web::post().to(logout))
        .route("/api/auth/forgot-password", web::post().to(forgot_password))
        .route("/api/auth/validate-reset-token", web::get().to(validate_reset_token))
        .route("/api/auth/reset-password", web::post().to(reset_password))
        // Users
        .route("/api/users/me", web::get().to(get_me))
        .route("/api/users/me", web::put().to(update_me))
        .route("/api/users/me/change-password", web::post().to(change_password))
        .route("/api/users/search", web::get().to(search_users))
        .route("/api/users/{id}", web::get().to(get_user))
        // Businesses
        .route("/api/businesses/search", web::get().to(search_businesses))
        .route("/api/businesses/categories", web::get().to(list_categories))
        .route("/api/businesses/my", web::get().to(my_businesses))
        .route("/api/businesses", web::post().to(create_business))
        .route("/api/businesses/{id}", web::get().to(get_business))
        .route("/api/businesses/{id}", web::put().to(update_business))
        .route("/api/businesses/{id}", web::delete().to(delete_business))
        .route("/api/businesses/{id}/reviews", web::get().to(list_reviews))
        // Service catalog
        .route("/api/businesses/{id}/services", web::get().to(list_services))
        .route("/api/businesses/{id}/services", web::post().to(create_service))
        .route("/api/businesses/{id}/services/{service_id}", web::get().to(get_service))
        .route("/api/businesses/{id}/services/{service_id}", web::put().to(update_service))
        .route("/api/businesses/{id}/services/{service_id}", web::delete().to(delete_service))
        // Workers
        .route("/api/workers/me", web::get().to(my_worker_records))
        .route("/api/businesses/{id}/workers", web::get().to(list_workers))
        .route("/api/businesses/{id}/workers", web::post().to(add_worker))
        .route("/api/businesses/{id}/workers/{worker_id}", web::get().to(get_worker))
        .route("/api/businesses/{id}/workers/{worker_id}", web::put().to(update_worker))
        .route("/api/businesses/{id}/workers/{worker_id}", web::delete().to(remove_worker))
        .route("/api/businesses/{id}/workers/{worker_id}/schedule", web::put().to(update_schedule))
        // Gallery
        .route("/api/businesses/{id}/images", web::get().to(list_images))
        .route("/api/businesses/{id}/images", web::post().to(add_image))
        .route("/api/businesses/{id}/images/{image_id}", web::delete().to(remove_image))
        // Reports
        .route("/api/businesses/{id}/reports", web::get().to(business_report))
        .route("/api/businesses/{id}/reports/export", web::get().to(export_report))
        // Appointments
        .route("/api/appointments", web::post().to(create_appointment))
        .route("/api/appointments/my", web::get().to(my_appointments))
        .route("/api/appointments/my/upcoming", web::get().to(my_upcoming))
        .route("/api/appointments/worker/{worker_id}", web::get().to(worker_appointments))
        .route("/api/appointments/worker/{worker_id}/upcoming", web::get().to(worker_upcoming))
        .route("/api/appointments/availability/{worker_id}", web::get().to(get_availability))
        .route("/api/appointments/{id}", web::get().to(get_appointment))
        .route("/api/appointments/{id}", web::patch().to(update_status))
        .route("/api/appointments/{id}/cancel", web::post().to(cancel_appointment))
        .route("/api/appointments/{id}/review", web::post().to(create_review))
        // Favorites
        .route("/api/favorites", web::get().to(list_favorites))
        .route("/api/favorites/all", web::get().to(all_favorites))
        .route("/api/favorites/ids", web::get().to(favorite_ids))
        .route("/api/favorites/count", web::get().to(count_favorites))
        .route("/api/favorites/check/{business_id}", web::get().to(check_favorite))
        .route("/api/favorites/{business_id}", web::post().to(add_favorite))
        .route("/api/favorites/{business_id}", web::delete().to(remove_favorite))
        .route("/api/favorites/{business_id}/toggle", web::post().to(toggle_favorite));
}
