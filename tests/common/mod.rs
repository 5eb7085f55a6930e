#![allow(dead_code)]

use actix_web::{test, App};
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde_json::{json, Value};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tempfile::TempDir;

use hairhub_backend::config::{AppConfig, RateLimitConfig};
use hairhub_backend::{handlers, AppState};

pub const PASSWORD: &str = "secret123";

pub struct TestApp {
    pub pool: SqlitePool,
    pub state: AppState,
    #[allow(dead_code)]
    pub temp_dir: TempDir,
}

/// A business with one 30 minute service and one worker available
/// 09:00-18:00 on `date`.
pub struct BookingSetup {
    pub owner_token: String,
    pub worker_token: String,
    pub client_token: String,
    pub client_id: i64,
    pub business_id: i64,
    pub service_id: i64,
    pub worker_id: i64,
    pub date: NaiveDate,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "sqlite::memory:".to_string(),
        bind_address: "127.0.0.1:0".parse().unwrap(),
        jwt_secret: "test_secret_key".to_string(),
        access_token_minutes: 60,
        refresh_token_days: 7,
        password_reset_minutes: 60,
        frontend_url: "http://localhost:3000".to_string(),
        cors_origin: None,
        email_enabled: false,
        email_from: "no-reply@hairhub.test".to_string(),
        dev_mode: true,
        cleanup_interval_secs: 300,
        rate_limit: RateLimitConfig::default(),
    }
}

/// A date a week ahead so every slot of the day lies in the future.
pub fn booking_date() -> NaiveDate {
    Local::now().date_naive() + Duration::days(7)
}

pub fn day_index(date: NaiveDate) -> i64 {
    date.weekday().num_days_from_sunday() as i64
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        // Create temporary database
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");
        let database_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&database_url)
            .await
            .expect("Failed to create database pool");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(pool.clone(), &config);

        Self {
            pool,
            state,
            temp_dir,
        }
    }

    pub fn create_app(
        &self,
    ) -> actix_web::App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = self.state.clone();
        App::new()
            .configure(move |cfg| state.configure(cfg))
            .configure(handlers::configure_routes)
    }

    /// Sends a request through a fresh app and returns status and JSON body.
    /// Empty bodies come back as `Value::Null`.
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (u16, Value) {
        let app = test::init_service(self.create_app()).await;

        let mut req = match method {
            "GET" => test::TestRequest::get(),
            "POST" => test::TestRequest::post(),
            "PUT" => test::TestRequest::put(),
            "PATCH" => test::TestRequest::patch(),
            "DELETE" => test::TestRequest::delete(),
            other => panic!("unsupported method {}", other),
        }
        .uri(uri);
        if let Some(token) = token {
            req = req.insert_header(bearer(token));
        }
        if let Some(body) = body {
            req = req.set_json(body);
        }

        let resp = test::call_service(&app, req.to_request()).await;
        let status = resp.status().as_u16();
        let bytes = test::read_body(resp).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    /// Registers an account and returns `(access_token, user_id)`.
    pub async fn register(&self, email: &str, role: &str) -> (String, i64) {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "full_name": format!("User {}", email.split('@').next().unwrap()),
                    "role": role
                })),
            )
            .await;
        assert_eq!(status, 200, "register failed: {}", body);
        (
            body["access_token"].as_str().unwrap().to_string(),
            body["user_id"].as_i64().unwrap(),
        )
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, 200, "login failed: {}", body);
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn create_business(&self, owner_token: &str, name: &str, city: &str) -> i64 {
        let (status, body) = self
            .call(
                "POST",
                "/api/businesses",
                Some(owner_token),
                Some(json!({
                    "name": name,
                    "category": "BARBERSHOP",
                    "description": "Cortes clásicos y modernos",
                    "city": city
                })),
            )
            .await;
        assert_eq!(status, 201, "create business failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn create_service(
        &self,
        owner_token: &str,
        business_id: i64,
        name: &str,
        duration_minutes: i64,
        price: f64,
    ) -> i64 {
        let (status, body) = self
            .call(
                "POST",
                &format!("/api/businesses/{}/services", business_id),
                Some(owner_token),
                Some(json!({
                    "name": name,
                    "duration_minutes": duration_minutes,
                    "price": price
                })),
            )
            .await;
        assert_eq!(status, 201, "create service failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn add_worker(&self, owner_token: &str, business_id: i64, email: &str) -> i64 {
        let (status, body) = self
            .call(
                "POST",
                &format!("/api/businesses/{}/workers", business_id),
                Some(owner_token),
                Some(json!({ "email": email, "position": "Barbero" })),
            )
            .await;
        assert_eq!(status, 201, "add worker failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    pub async fn set_schedule(
        &self,
        token: &str,
        business_id: i64,
        worker_id: i64,
        day_of_week: i64,
        start: &str,
        end: &str,
    ) -> (u16, Value) {
        self.call(
            "PUT",
            &format!("/api/businesses/{}/workers/{}/schedule", business_id, worker_id),
            Some(token),
            Some(json!([{
                "day_of_week": day_of_week,
                "start_time": start,
                "end_time": end,
                "is_available": true
            }])),
        )
        .await
    }

    pub async fn booking_setup(&self) -> BookingSetup {
        let (owner_token, _) = self.register("owner@hairhub.test", "OWNER").await;
        self.register("worker@hairhub.test", "CLIENT").await;
        let (client_token, client_id) = self.register("client@hairhub.test", "CLIENT").await;

        let business_id = self
            .create_business(&owner_token, "Barbería Central", "Bogotá")
            .await;
        let service_id = self
            .create_service(&owner_token, business_id, "Corte clásico", 30, 25.0)
            .await;
        let worker_id = self
            .add_worker(&owner_token, business_id, "worker@hairhub.test")
            .await;

        let date = booking_date();
        let (status, body) = self
            .set_schedule(&owner_token, business_id, worker_id, day_index(date), "09:00:00", "18:00:00")
            .await;
        assert_eq!(status, 200, "set schedule failed: {}", body);

        // The worker role is granted after registration, so sign in again
        let worker_token = self.login("worker@hairhub.test", PASSWORD).await;

        BookingSetup {
            owner_token,
            worker_token,
            client_token,
            client_id,
            business_id,
            service_id,
            worker_id,
            date,
        }
    }

    pub async fn book(&self, client_token: &str, setup: &BookingSetup, time: &str) -> (u16, Value) {
        self.call(
            "POST",
            "/api/appointments",
            Some(client_token),
            Some(json!({
                "worker_id": setup.worker_id,
                "service_id": setup.service_id,
                "start_time": format!("{}T{}", setup.date, time),
                "client_notes": "Primera visita"
            })),
        )
        .await
    }
}
