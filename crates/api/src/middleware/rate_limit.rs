//! Per-account rate limiting for authentication endpoints.
//!
//! Signup, login, and password-reset are credential-guessing surfaces, so
//! they are limited per submitted account rather than per connection. The
//! auth handlers call [`RateLimiterState::check`] with the normalized email
//! before touching the password hash.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovRateLimiter,
};
use std::{
    collections::HashMap,
    num::NonZeroU32,
    sync::{Arc, RwLock},
};

type AccountRateLimiter = GovRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter state shared across all requests, one limiter per account
/// key (lowercased email).
pub struct RateLimiterState {
    limiters: RwLock<HashMap<String, Arc<AccountRateLimiter>>>,
    limit_per_minute: u32,
}

impl RateLimiterState {
    /// Create a new rate limiter state with the given per-minute limit.
    pub fn new(limit_per_minute: u32) -> Self {
        Self {
            limiters: RwLock::new(HashMap::new()),
            limit_per_minute,
        }
    }

    fn get_or_create_limiter(&self, key: &str) -> Arc<AccountRateLimiter> {
        {
            let limiters = self.limiters.read().unwrap();
            if let Some(limiter) = limiters.get(key) {
                return limiter.clone();
            }
        }

        let mut limiters = self.limiters.write().unwrap();

        // Another thread may have created it between the locks.
        if let Some(limiter) = limiters.get(key) {
            return limiter.clone();
        }

        let quota = Quota::per_minute(
            NonZeroU32::new(self.limit_per_minute).unwrap_or(NonZeroU32::new(20).unwrap()),
        );
        let limiter = Arc::new(GovRateLimiter::direct(quota));
        limiters.insert(key.to_string(), limiter.clone());
        limiter
    }

    /// Check whether a request for the given account key is allowed.
    ///
    /// Returns Err with the retry-after seconds when rate limited. Keys are
    /// normalized to lowercase so `Ada@x.com` and `ada@x.com` share a bucket.
    pub fn check(&self, key: &str) -> Result<(), u64> {
        let limiter = self.get_or_create_limiter(&key.to_lowercase());

        match limiter.check() {
            Ok(_) => Ok(()),
            Err(not_until) => {
                let wait_time = not_until.wait_time_from(governor::clock::Clock::now(
                    &governor::clock::DefaultClock::default(),
                ));
                Err(wait_time.as_secs().max(1))
            }
        }
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("limit_per_minute", &self.limit_per_minute)
            .field("active_limiters", &self.limiters.read().unwrap().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows_requests_under_limit() {
        let state = RateLimiterState::new(5);
        for i in 0..5 {
            assert!(state.check("ada@example.com").is_ok(), "request {}", i);
        }
    }

    #[test]
    fn test_rejects_over_limit_with_retry_after() {
        let state = RateLimiterState::new(1);
        assert!(state.check("ada@example.com").is_ok());

        let result = state.check("ada@example.com");
        assert!(result.is_err());
        assert!(result.unwrap_err() >= 1);
    }

    #[test]
    fn test_accounts_are_independent() {
        let state = RateLimiterState::new(1);
        assert!(state.check("a@example.com").is_ok());
        assert!(state.check("b@example.com").is_ok());
        assert!(state.check("a@example.com").is_err());
    }

    #[test]
    fn test_key_normalization() {
        let state = RateLimiterState::new(1);
        assert!(state.check("Ada@Example.com").is_ok());
        assert!(state.check("ada@example.com").is_err());
    }

    #[test]
    fn test_debug_output() {
        let state = RateLimiterState::new(20);
        state.check("x@example.com").unwrap();
        let debug = format!("{:?}", state);
        assert!(debug.contains("RateLimiterState"));
        assert!(debug.contains("active_limiters"));
    }
}
