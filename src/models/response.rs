use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use super::domain::{
    day_name, AppointmentStatus, Business, BusinessCategory, Role, ServiceOffering,
    WorkerSchedule,
};

// Common response types
#[derive(Serialize, ToSchema)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    pub status: u16,
}

/// Zero-based page of results.
#[derive(Debug, Serialize, ToSchema)]
#[aliases(
    BusinessPage = PageResponse<BusinessSummary>,
    AppointmentPage = PageResponse<AppointmentResponse>,
    FavoritePage = PageResponse<FavoriteResponse>
)]
pub struct PageResponse<T> {
    pub content: Vec<T>,
    pub total_elements: i64,
    pub total_pages: i64,
    pub current_page: i64,
    pub page_size: i64,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> PageResponse<T> {
    pub fn new(content: Vec<T>, total_elements: i64, page: i64, size: i64) -> Self {
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };
        Self {
            empty: content.is_empty(),
            content,
            total_elements,
            total_pages,
            current_page: page,
            page_size: size,
            first: page == 0,
            last: page + 1 >= total_pages,
        }
    }
}

// Authentication responses
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ForgotPasswordResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_reset_link: Option<String>,
}

// Users
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub full_name: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
}

// Businesses
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryResponse {
    pub value: BusinessCategory,
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessSummary {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub category: BusinessCategory,
    pub category_label: String,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub cover_image_url: Option<String>,
    pub average_rating: Option<f64>,
    pub total_reviews: i64,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

impl From<Business> for BusinessSummary {
    fn from(business: Business) -> Self {
        Self {
            id: business.id,
            owner_id: business.owner_id,
            category_label: business.category.label().to_string(),
            category: business.category,
            name: business.name,
            description: business.description,
            address: business.address,
            city: business.city,
            phone: business.phone,
            cover_image_url: business.cover_image_url,
            average_rating: business.average_rating,
            total_reviews: business.total_reviews,
            active: business.active,
            created_at: business.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BusinessDetailResponse {
    #[serde(flatten)]
    pub business: BusinessSummary,
    pub owner_name: String,
    pub services: Vec<ServiceOffering>,
    pub workers: Vec<WorkerResponse>,
    pub gallery: Vec<String>,
}

// Workers
#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub id: i64,
    pub day_of_week: i64,
    pub day_name: String,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "18:00:00")]
    pub end_time: NaiveTime,
    pub is_available: bool,
}

impl From<WorkerSchedule> for ScheduleResponse {
    fn from(schedule: WorkerSchedule) -> Self {
        Self {
            id: schedule.id,
            day_name: day_name(schedule.day_of_week).to_string(),
            day_of_week: schedule.day_of_week,
            start_time: schedule.start_time,
            end_time: schedule.end_time,
            is_available: schedule.is_available,
        }
    }
}

/// Worker joined with the account and business it belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct WorkerProfileRow {
    pub id: i64,
    pub user_id: i64,
    pub business_id: i64,
    pub business_name: String,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub position: Option<String>,
    pub active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WorkerResponse {
    pub id: i64,
    pub user_id: i64,
    pub business_id: i64,
    pub business_name: String,
    pub full_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub position: Option<String>,
    pub active: bool,
    pub schedules: Vec<ScheduleResponse>,
}

impl WorkerResponse {
    pub fn new(row: WorkerProfileRow, schedules: Vec<WorkerSchedule>) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            business_id: row.business_id,
            business_name: row.business_name,
            full_name: row.full_name,
            email: row.email,
            avatar_url: row.avatar_url,
            position: row.position,
            active: row.active,
            schedules: schedules.into_iter().map(ScheduleResponse::from).collect(),
        }
    }
}

// Appointments
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct AppointmentResponse {
    pub id: i64,
    pub client_id: i64,
    pub client_name: String,
    pub client_email: String,
    pub worker_id: i64,
    pub worker_name: String,
    pub service_id: i64,
    pub service_name: String,
    pub service_price: f64,
    pub duration_minutes: i64,
    pub business_id: i64,
    pub business_name: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: AppointmentStatus,
    pub client_notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub has_review: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ReviewResponse {
    pub id: i64,
    pub appointment_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub client_name: String,
    pub service_name: String,
    pub created_at: NaiveDateTime,
}

// Favorites
#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteResponse {
    pub id: i64,
    pub business: BusinessSummary,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavoriteCheckResponse {
    pub business_id: i64,
    pub is_favorite: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CountResponse {
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_flags_for_middle_page() {
        let page = PageResponse::new(vec![1, 2], 25, 1, 10);
        assert_eq!(page.total_pages, 3);
        assert!(!page.first);
        assert!(!page.last);
        assert!(!page.empty);
    }

    #[test]
    fn empty_result_is_a_single_last_page() {
        let page: PageResponse<i64> = PageResponse::new(vec![], 0, 0, 10);
        assert_eq!(page.total_pages, 0);
        assert!(page.first);
        assert!(page.last);
        assert!(page.empty);
    }
}
