pub mod auth;
pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi_config;
pub mod repositories;
pub mod scheduler;
pub mod services;
pub mod state;

pub use state::AppState;
