use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::RwLock;
use tokio::time::interval;

use crate::repositories::TokenRepository;
use crate::services::{AppointmentService, RateLimitService};

/// Periodic housekeeping: drops expired or used auth tokens, rate limit
/// buckets that have refilled and idle booking locks.
pub struct BackgroundScheduler {
    tokens: Arc<dyn TokenRepository>,
    rate_limits: Arc<RateLimitService>,
    appointments: Arc<AppointmentService>,
    period: Duration,
    running: Arc<RwLock<bool>>,
}

impl BackgroundScheduler {
    pub fn new(
        tokens: Arc<dyn TokenRepository>,
        rate_limits: Arc<RateLimitService>,
        appointments: Arc<AppointmentService>,
        period: Duration,
    ) -> Self {
        Self {
            tokens,
            rate_limits,
            appointments,
            period,
            running: Arc::new(RwLock::new(false)),
        }
    }

    pub async fn start(&self) {
        let mut running = self.running.write().await;
        if *running {
            tracing::warn!("Background scheduler is already running");
            return;
        }
        *running = true;

        let tokens = Arc::clone(&self.tokens);
        let rate_limits = Arc::clone(&self.rate_limits);
        let appointments = Arc::clone(&self.appointments);
        let running_flag = Arc::clone(&self.running);
        let period = self.period;

        tokio::spawn(async move {
            tracing::info!("Background scheduler started, running every {:?}", period);
            let mut ticker = interval(period);
            // first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;

                if !*running_flag.read().await {
                    tracing::info!("Background scheduler stopped");
                    break;
                }

                Self::run_cleanup(tokens.as_ref(), &rate_limits, &appointments).await;
            }
        });
    }

    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        *running = false;
        tracing::info!("Background scheduler stop requested");
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Returns the purged token, rate limit bucket and booking lock counts.
    pub async fn run_cleanup_once(&self) -> (u64, usize, usize) {
        Self::run_cleanup(self.tokens.as_ref(), &self.rate_limits, &self.appointments).await
    }

    async fn run_cleanup(
        tokens: &dyn TokenRepository,
        rate_limits: &RateLimitService,
        appointments: &AppointmentService,
    ) -> (u64, usize, usize) {
        let purged = match tokens.purge_expired(Utc::now().naive_utc()).await {
            Ok(count) => count,
            Err(e) => {
                tracing::error!("Failed to purge expired tokens: {}", e);
                0
            }
        };
        let buckets = rate_limits.cleanup();
        let locks = appointments.prune_booking_locks();

        if purged > 0 || buckets > 0 || locks > 0 {
            tracing::debug!(
                "Cleanup removed {} token(s), {} rate limit bucket(s) and {} booking lock(s)",
                purged,
                buckets,
                locks
            );
        }
        (purged, buckets, locks)
    }
}
