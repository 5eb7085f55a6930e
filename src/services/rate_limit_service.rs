use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::models::ServiceError;

#[derive(Debug, Clone, Copy)]
struct Bucket {
    available: u32,
    last_refill: Instant,
}

/// Token bucket per key that refills completely once per window.
pub struct RateLimiter {
    capacity: u32,
    window: Duration,
    buckets: DashMap<String, Bucket>,
}

impl RateLimiter {
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            window,
            buckets: DashMap::new(),
        }
    }

    fn refill(&self, bucket: &mut Bucket, now: Instant) {
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        if elapsed >= self.window {
            let windows = (elapsed.as_nanos() / self.window.as_nanos().max(1)) as u32;
            bucket.available = self.capacity;
            bucket.last_refill += self.window * windows;
        }
    }

    pub fn try_consume(&self, key: &str) -> bool {
        self.try_consume_at(key, Instant::now())
    }

    fn try_consume_at(&self, key: &str, now: Instant) -> bool {
        let mut bucket = self.buckets.entry(key.to_string()).or_insert(Bucket {
            available: self.capacity,
            last_refill: now,
        });
        self.refill(&mut bucket, now);
        if bucket.available > 0 {
            bucket.available -= 1;
            true
        } else {
            false
        }
    }

    #[cfg(test)]
    fn remaining(&self, key: &str) -> u32 {
        self.remaining_at(key, Instant::now())
    }

    #[cfg(test)]
    fn remaining_at(&self, key: &str, now: Instant) -> u32 {
        match self.buckets.get_mut(key) {
            Some(mut bucket) => {
                self.refill(&mut bucket, now);
                bucket.available
            }
            None => self.capacity,
        }
    }

    pub fn reset(&self, key: &str) {
        self.buckets.remove(key);
    }

    /// Drops buckets that are back at full capacity. Returns how many went.
    pub fn cleanup(&self) -> usize {
        self.cleanup_at(Instant::now())
    }

    fn cleanup_at(&self, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| {
            let elapsed = now.saturating_duration_since(bucket.last_refill);
            bucket.available < self.capacity && elapsed < self.window
        });
        before - self.buckets.len()
    }

    pub fn tracked_keys(&self) -> usize {
        self.buckets.len()
    }
}

pub struct RateLimitService {
    login: RateLimiter,
    password_reset: RateLimiter,
    general: RateLimiter,
}

impl RateLimitService {
    pub fn new(config: &RateLimitConfig) -> Self {
        let minutes = |m: i64| Duration::from_secs(m.max(0) as u64 * 60);
        Self {
            login: RateLimiter::new(config.login_requests, minutes(config.login_window_minutes)),
            password_reset: RateLimiter::new(
                config.password_reset_requests,
                minutes(config.password_reset_window_minutes),
            ),
            general: RateLimiter::new(config.general_requests, minutes(config.general_window_minutes)),
        }
    }

    pub fn login_key(ip: &str, email: &str) -> String {
        format!("{}:{}", ip, email.trim().to_lowercase())
    }

    pub fn check_login(&self, key: &str) -> Result<(), ServiceError> {
        if self.login.try_consume(key) {
            Ok(())
        } else {
            tracing::warn!("Login rate limit exceeded for {}", key);
            Err(ServiceError::RateLimited(
                "Too many login attempts. Please try again later.".to_string(),
            ))
        }
    }

    pub fn reset_login(&self, key: &str) {
        self.login.reset(key);
    }

    pub fn check_password_reset(&self, key: &str) -> Result<(), ServiceError> {
        if self.password_reset.try_consume(key) {
            Ok(())
        } else {
            tracing::warn!("Password reset rate limit exceeded for {}", key);
            Err(ServiceError::RateLimited(
                "Too many password reset requests. Please try again later.".to_string(),
            ))
        }
    }

    pub fn check_general(&self, key: &str) -> Result<(), ServiceError> {
        if self.general.try_consume(key) {
            Ok(())
        } else {
            Err(ServiceError::RateLimited(
                "Too many requests. Please slow down.".to_string(),
            ))
        }
    }

    pub fn cleanup(&self) -> usize {
        self.login.cleanup() + self.password_reset.cleanup() + self.general.cleanup()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_blocks_after_capacity() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));
        assert!(limiter.try_consume("k"));
        assert!(limiter.try_consume("k"));
        assert!(limiter.try_consume("k"));
        assert!(!limiter.try_consume("k"));
        assert_eq!(limiter.remaining("k"), 0);
        // Other keys are independent
        assert!(limiter.try_consume("other"));
    }

    #[test]
    fn bucket_refills_after_window() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        assert!(limiter.try_consume_at("k", start));
        assert!(limiter.try_consume_at("k", start));
        assert!(!limiter.try_consume_at("k", start + Duration::from_secs(30)));
        assert!(limiter.try_consume_at("k", start + Duration::from_secs(61)));
        assert_eq!(limiter.remaining_at("k", start + Duration::from_secs(61)), 1);
    }

    #[test]
    fn reset_restores_full_capacity() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.try_consume("k"));
        assert!(!limiter.try_consume("k"));
        limiter.reset("k");
        assert_eq!(limiter.remaining("k"), 1);
        assert!(limiter.try_consume("k"));
    }

    #[test]
    fn cleanup_drops_only_recovered_buckets() {
        let limiter = RateLimiter::new(2, Duration::from_secs(60));
        let start = Instant::now();
        limiter.try_consume_at("idle", start);
        limiter.try_consume_at("busy", start + Duration::from_secs(90));

        let later = start + Duration::from_secs(120);
        let removed = limiter.cleanup_at(later);
        assert_eq!(removed, 1);
        assert_eq!(limiter.tracked_keys(), 1);
        assert_eq!(limiter.remaining_at("busy", later), 1);
    }

    #[test]
    fn login_key_normalizes_email() {
        assert_eq!(
            RateLimitService::login_key("10.0.0.1", " Ana@Example.com "),
            "10.0.0.1:ana@example.com"
        );
    }

    #[test]
    fn service_reports_rate_limited_error() {
        let service = RateLimitService::new(&RateLimitConfig {
            login_requests: 1,
            ..RateLimitConfig::default()
        });
        assert!(service.check_login("ip:a").is_ok());
        assert!(matches!(
            service.check_login("ip:a"),
            Err(ServiceError::RateLimited(_))
        ));
        service.reset_login("ip:a");
        assert!(service.check_login("ip:a").is_ok());
    }
}
