use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::domain::{AppointmentStatus, BusinessCategory, Role};

// Authentication forms
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 6, max = 100, message = "Password must be between 6 and 100 characters"))]
    pub password: String,
    #[validate(length(min = 2, max = 100, message = "Full name must be between 2 and 100 characters"))]
    pub full_name: String,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Token is required"))]
    pub token: String,
    #[validate(length(min = 6, max = 100, message = "Password must be between 6 and 100 characters"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TokenQuery {
    pub token: String,
}

// User profile forms
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    #[validate(length(min = 6, max = 100, message = "New password must be between 6 and 100 characters"))]
    pub new_password: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 100, message = "Full name must be between 2 and 100 characters"))]
    pub full_name: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 500, message = "Bio must be at most 500 characters"))]
    pub bio: Option<String>,
    #[validate(length(max = 500, message = "Avatar URL must be at most 500 characters"))]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserSearchQuery {
    pub email: String,
}

// Paging
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PageQuery {
    pub const DEFAULT_SIZE: i64 = 10;
    pub const MAX_SIZE: i64 = 100;

    /// Zero-based page index and a size clamped to 1..=100.
    pub fn resolve(&self) -> (i64, i64) {
        let page = self.page.unwrap_or(0).max(0);
        let size = self
            .size
            .unwrap_or(Self::DEFAULT_SIZE)
            .clamp(1, Self::MAX_SIZE);
        (page, size)
    }
}

// Business forms
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBusinessRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    pub category: BusinessCategory,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 100, message = "City must be at most 100 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 500, message = "Cover image URL must be at most 500 characters"))]
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBusinessRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    pub category: Option<BusinessCategory>,
    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,
    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,
    #[validate(length(max = 100, message = "City must be at most 100 characters"))]
    pub city: Option<String>,
    #[validate(length(max = 20, message = "Phone must be at most 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(max = 500, message = "Cover image URL must be at most 500 characters"))]
    pub cover_image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BusinessSearchQuery {
    pub query: Option<String>,
    pub category: Option<BusinessCategory>,
    pub city: Option<String>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl BusinessSearchQuery {
    pub fn paging(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            size: self.size,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddImageRequest {
    #[validate(length(min = 1, max = 500, message = "Image URL must be between 1 and 500 characters"))]
    pub image_url: String,
    #[validate(length(max = 200, message = "Caption must be at most 200 characters"))]
    pub caption: Option<String>,
}

// Service catalog forms
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateServiceRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: String,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 5, max = 480, message = "Duration must be between 5 and 480 minutes"))]
    pub duration_minutes: i64,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image_url: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateServiceRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"))]
    pub name: Option<String>,
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,
    #[validate(range(min = 5, max = 480, message = "Duration must be between 5 and 480 minutes"))]
    pub duration_minutes: Option<i64>,
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: Option<f64>,
    #[validate(length(max = 500, message = "Image URL must be at most 500 characters"))]
    pub image_url: Option<String>,
    pub active: Option<bool>,
}

// Worker forms
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct AddWorkerRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(max = 100, message = "Position must be at most 100 characters"))]
    pub position: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateWorkerRequest {
    #[validate(length(max = 100, message = "Position must be at most 100 characters"))]
    pub position: Option<String>,
    pub active: Option<bool>,
}

fn default_available() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ScheduleEntryRequest {
    #[validate(range(min = 0, max = 6, message = "Day of week must be between 0 (Sunday) and 6 (Saturday)"))]
    pub day_of_week: i64,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "18:00:00")]
    pub end_time: NaiveTime,
    #[serde(default = "default_available")]
    pub is_available: bool,
}

// Appointment forms
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAppointmentRequest {
    pub worker_id: i64,
    pub service_id: i64,
    pub start_time: NaiveDateTime,
    #[validate(length(max = 500, message = "Notes must be at most 500 characters"))]
    pub client_notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAppointmentStatusRequest {
    pub status: AppointmentStatus,
    #[validate(length(max = 500, message = "Cancellation reason must be at most 500 characters"))]
    pub cancellation_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CancelQuery {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateReviewRequest {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i64,
    #[validate(length(max = 1000, message = "Comment must be at most 1000 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub duration: Option<i64>,
}

// Reports
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults_and_clamps() {
        assert_eq!(PageQuery::default().resolve(), (0, 10));
        let query = PageQuery {
            page: Some(-3),
            size: Some(1000),
        };
        assert_eq!(query.resolve(), (0, 100));
    }

    #[test]
    fn service_duration_bounds_are_enforced() {
        let form = CreateServiceRequest {
            name: "Corte".into(),
            description: None,
            duration_minutes: 2,
            price: 10.0,
            image_url: None,
        };
        assert!(form.validate().is_err());

        let form = CreateServiceRequest {
            duration_minutes: 30,
            ..form
        };
        assert!(form.validate().is_ok());
    }

    #[test]
    fn schedule_entry_defaults_to_available() {
        let entry: ScheduleEntryRequest = serde_json::from_value(serde_json::json!({
            "day_of_week": 1,
            "start_time": "09:00:00",
            "end_time": "18:00:00"
        }))
        .unwrap();
        assert!(entry.is_available);
        assert!(entry.validate().is_ok());
    }
}
