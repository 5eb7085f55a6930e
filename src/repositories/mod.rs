pub mod appointment_repository;
pub mod business_repository;
pub mod favorite_repository;
pub mod review_repository;
pub mod service_repository;
pub mod token_repository;
pub mod user_repository;
pub mod worker_repository;

pub use appointment_repository::*;
pub use business_repository::*;
pub use favorite_repository::*;
pub use review_repository::*;
pub use service_repository::*;
pub use token_repository::*;
pub use user_repository::*;
pub use worker_repository::*;
