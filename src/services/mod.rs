pub mod appointment_service;
pub mod auth_service;
pub mod business_service;
pub mod catalog_service;
pub mod email_service;
pub mod favorite_service;
pub mod rate_limit_service;
pub mod report_service;
pub mod user_service;
pub mod worker_service;

pub use appointment_service::*;
pub use auth_service::*;
pub use business_service::*;
pub use catalog_service::*;
pub use email_service::*;
pub use favorite_service::*;
pub use rate_limit_service::*;
pub use report_service::*;
pub use user_service::*;
pub use worker_service::*;
