use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub login_requests: u32,
    pub login_window_minutes: i64,
    pub password_reset_requests: u32,
    pub password_reset_window_minutes: i64,
    pub general_requests: u32,
    pub general_window_minutes: i64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login_requests: 5,
            login_window_minutes: 15,
            password_reset_requests: 3,
            password_reset_window_minutes: 60,
            general_requests: 100,
            general_window_minutes: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_address: SocketAddr,
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub password_reset_minutes: i64,
    pub frontend_url: String,
    pub cors_origin: Option<String>,
    pub email_enabled: bool,
    pub email_from: String,
    pub dev_mode: bool,
    pub cleanup_interval_secs: u64,
    pub rate_limit: RateLimitConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env_or("PORT", 8080)?;

        let bind_address = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:hairhub.db?mode=rwc".to_string());

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set, generating an ephemeral secret");
            use rand::Rng;
            let mut rng = rand::thread_rng();
            let bytes: [u8; 32] = rng.gen();
            use base64::Engine;
            base64::engine::general_purpose::STANDARD.encode(bytes)
        });

        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            login_requests: env_or("RATE_LIMIT_LOGIN_REQUESTS", defaults.login_requests)?,
            login_window_minutes: env_or("RATE_LIMIT_LOGIN_MINUTES", defaults.login_window_minutes)?,
            password_reset_requests: env_or(
                "RATE_LIMIT_PASSWORD_RESET_REQUESTS",
                defaults.password_reset_requests,
            )?,
            password_reset_window_minutes: env_or(
                "RATE_LIMIT_PASSWORD_RESET_MINUTES",
                defaults.password_reset_window_minutes,
            )?,
            general_requests: env_or("RATE_LIMIT_GENERAL_REQUESTS", defaults.general_requests)?,
            general_window_minutes: env_or(
                "RATE_LIMIT_GENERAL_MINUTES",
                defaults.general_window_minutes,
            )?,
        };

        Ok(Self {
            database_url,
            bind_address,
            jwt_secret,
            access_token_minutes: env_or("ACCESS_TOKEN_MINUTES", 60)?,
            refresh_token_days: env_or("REFRESH_TOKEN_DAYS", 7)?,
            password_reset_minutes: env_or("PASSWORD_RESET_MINUTES", 60)?,
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            cors_origin: std::env::var("CORS_ORIGIN").ok(),
            email_enabled: env_or("EMAIL_ENABLED", false)?,
            email_from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "no-reply@hairhub.local".to_string()),
            dev_mode: env_or("DEV_MODE", false)?,
            cleanup_interval_secs: env_or("CLEANUP_INTERVAL_SECS", 300)?,
            rate_limit,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        Err(_) => Ok(default),
    }
}
