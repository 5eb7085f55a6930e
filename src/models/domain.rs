use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Owner,
    Worker,
    Client,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Worker => "WORKER",
            Role::Client => "CLIENT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusinessCategory {
    Barbershop,
    HairSalon,
    NailSalon,
    Spa,
    CarWash,
    PetGrooming,
    TattooStudio,
    Other,
}

impl BusinessCategory {
    pub const ALL: [BusinessCategory; 8] = [
        BusinessCategory::Barbershop,
        BusinessCategory::HairSalon,
        BusinessCategory::NailSalon,
        BusinessCategory::Spa,
        BusinessCategory::CarWash,
        BusinessCategory::PetGrooming,
        BusinessCategory::TattooStudio,
        BusinessCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessCategory::Barbershop => "BARBERSHOP",
            BusinessCategory::HairSalon => "HAIR_SALON",
            BusinessCategory::NailSalon => "NAIL_SALON",
            BusinessCategory::Spa => "SPA",
            BusinessCategory::CarWash => "CAR_WASH",
            BusinessCategory::PetGrooming => "PET_GROOMING",
            BusinessCategory::TattooStudio => "TATTOO_STUDIO",
            BusinessCategory::Other => "OTHER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BusinessCategory::Barbershop => "Barbería",
            BusinessCategory::HairSalon => "Salón de Belleza",
            BusinessCategory::NailSalon => "Manicura/Pedicura",
            BusinessCategory::Spa => "Spa",
            BusinessCategory::CarWash => "Autolavado",
            BusinessCategory::PetGrooming => "Peluquería de Mascotas",
            BusinessCategory::TattooStudio => "Estudio de Tatuajes",
            BusinessCategory::Other => "Otro",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 5] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Confirmed,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "PENDING",
            AppointmentStatus::Confirmed => "CONFIRMED",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }

    /// Whether the appointment still holds its time slot.
    pub fn blocks_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::NoShow)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, Completed)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
        )
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub enabled: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub user_id: i64,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: NaiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: NaiveDateTime,
    pub used: bool,
}

impl PasswordResetToken {
    pub fn is_valid_at(&self, now: NaiveDateTime) -> bool {
        !self.used && self.expires_at > now
    }
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct Business {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub category: BusinessCategory,
    pub description: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub cover_image_url: Option<String>,
    pub active: bool,
    pub average_rating: Option<f64>,
    pub total_reviews: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct BusinessImage {
    pub id: i64,
    pub business_id: i64,
    pub image_url: String,
    pub caption: Option<String>,
    pub display_order: i64,
}

/// A bookable offering of a business ("service" in the public API).
#[derive(Debug, Clone, FromRow, Serialize, ToSchema)]
pub struct ServiceOffering {
    pub id: i64,
    pub business_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub duration_minutes: i64,
    pub price: f64,
    pub image_url: Option<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Worker {
    pub id: i64,
    pub user_id: i64,
    pub business_id: i64,
    pub position: Option<String>,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct WorkerSchedule {
    pub id: i64,
    pub worker_id: i64,
    pub day_of_week: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct Appointment {
    pub id: i64,
    pub client_id: i64,
    pub worker_id: i64,
    pub service_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: AppointmentStatus,
    pub client_notes: Option<String>,
    pub cancellation_reason: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: i64,
    pub appointment_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: NaiveDateTime,
}

pub fn day_name(day_of_week: i64) -> &'static str {
    match day_of_week {
        0 => "Domingo",
        1 => "Lunes",
        2 => "Martes",
        3 => "Miércoles",
        4 => "Jueves",
        5 => "Viernes",
        6 => "Sábado",
        _ => "Desconocido",
    }
}
