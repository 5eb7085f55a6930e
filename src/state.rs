use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use sqlx::SqlitePool;

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::repositories::{
    SqliteAppointmentRepository, SqliteBusinessRepository, SqliteFavoriteRepository,
    SqliteReviewRepository, SqliteServiceOfferingRepository, SqliteTokenRepository,
    SqliteUserRepository, SqliteWorkerRepository,
};
use crate::scheduler::BackgroundScheduler;
use crate::services::{
    AppointmentService, AuthService, AuthSettings, BusinessService, CatalogService, EmailService,
    FavoriteService, RateLimitService, ReportService, UserService, WorkerService,
};

/// Every shared component of the server, wired once and cloned into each
/// actix worker.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt_manager: web::Data<JwtManager>,
    pub email_service: Arc<EmailService>,
    pub rate_limits: Arc<RateLimitService>,
    pub scheduler: Arc<BackgroundScheduler>,
    pub auth_service: web::Data<AuthService>,
    pub user_service: web::Data<UserService>,
    pub business_service: web::Data<BusinessService>,
    pub catalog_service: web::Data<CatalogService>,
    pub worker_service: web::Data<WorkerService>,
    pub appointment_service: web::Data<AppointmentService>,
    pub favorite_service: web::Data<FavoriteService>,
    pub report_service: web::Data<ReportService>,
}

impl AppState {
    pub fn new(pool: SqlitePool, config: &AppConfig) -> Self {
        // Initialize repositories
        let users = Arc::new(SqliteUserRepository::new(pool.clone()));
        let tokens = Arc::new(SqliteTokenRepository::new(pool.clone()));
        let businesses = Arc::new(SqliteBusinessRepository::new(pool.clone()));
        let services = Arc::new(SqliteServiceOfferingRepository::new(pool.clone()));
        let workers = Arc::new(SqliteWorkerRepository::new(pool.clone()));
        let appointments = Arc::new(SqliteAppointmentRepository::new(pool.clone()));
        let reviews = Arc::new(SqliteReviewRepository::new(pool.clone()));
        let favorites = Arc::new(SqliteFavoriteRepository::new(pool.clone()));

        let jwt_manager = JwtManager::with_lifetimes(
            &config.jwt_secret,
            config.access_token_minutes,
            config.refresh_token_days,
        );
        let email_service = Arc::new(EmailService::new(
            config.email_enabled,
            config.email_from.clone(),
            config.frontend_url.clone(),
        ));
        let rate_limits = Arc::new(RateLimitService::new(&config.rate_limit));

        // Initialize services with dependency injection
        let auth_service = AuthService::new(
            users.clone(),
            tokens.clone(),
            jwt_manager.clone(),
            email_service.clone(),
            AuthSettings {
                password_reset_minutes: config.password_reset_minutes,
                dev_mode: config.dev_mode,
            },
        );
        let user_service = UserService::new(users.clone(), tokens.clone());
        let business_service = BusinessService::new(
            businesses.clone(),
            services.clone(),
            workers.clone(),
            users.clone(),
            reviews.clone(),
        );
        let catalog_service = CatalogService::new(businesses.clone(), services.clone());
        let worker_service = WorkerService::new(businesses.clone(), workers.clone(), users);
        let appointment_service = Arc::new(AppointmentService::new(
            appointments.clone(),
            workers,
            services,
            businesses.clone(),
            reviews,
            email_service.clone(),
        ));
        let favorite_service = FavoriteService::new(favorites, businesses.clone());
        let report_service = ReportService::new(businesses, appointments);

        let scheduler = Arc::new(BackgroundScheduler::new(
            tokens,
            rate_limits.clone(),
            appointment_service.clone(),
            Duration::from_secs(config.cleanup_interval_secs.max(1)),
        ));

        Self {
            pool,
            jwt_manager: web::Data::new(jwt_manager),
            email_service,
            rate_limits,
            scheduler,
            auth_service: web::Data::new(auth_service),
            user_service: web::Data::new(user_service),
            business_service: web::Data::new(business_service),
            catalog_service: web::Data::new(catalog_service),
            worker_service: web::Data::new(worker_service),
            appointment_service: web::Data::from(appointment_service),
            favorite_service: web::Data::new(favorite_service),
            report_service: web::Data::new(report_service),
        }
    }

    /// Registers the shared state as app data. Pair with
    /// `handlers::configure_routes`.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.pool.clone()))
            .app_data(self.jwt_manager.clone())
            .app_data(web::Data::from(self.rate_limits.clone()))
            .app_data(web::Data::from(self.scheduler.clone()))
            .app_data(self.auth_service.clone())
            .app_data(self.user_service.clone())
            .app_data(self.business_service.clone())
            .app_data(self.catalog_service.clone())
            .app_data(self.worker_service.clone())
            .app_data(self.appointment_service.clone())
            .app_data(self.favorite_service.clone())
            .app_data(self.report_service.clone());
    }
}
