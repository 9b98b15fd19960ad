//! Two-window request throttling: a short burst window plus a daily quota.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::window::{FixedWindowStore, RateLimitDecision, now_millis};

/// Length of the daily quota window.
pub const DAILY_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Default short window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Default requests allowed per short window.
pub const DEFAULT_WINDOW_MAX: u32 = 60;

/// Default requests allowed per day.
pub const DEFAULT_DAILY_MAX: u32 = 500;

/// Quota configuration, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window: Duration,
    pub window_max: u32,
    pub daily_max: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            window_max: DEFAULT_WINDOW_MAX,
            daily_max: DEFAULT_DAILY_MAX,
        }
    }
}

/// Which quota rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitScope {
    Window,
    Daily,
}

impl fmt::Display for LimitScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Window => "window",
            Self::Daily => "daily",
        };
        write!(f, "{label}")
    }
}

/// A request refused by one of the quotas.
///
/// This is an expected outcome rather than a fault; `reset_at` (epoch
/// milliseconds) tells the client when to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{scope} rate limit of {limit} requests exceeded, retry at {reset_at}")]
pub struct RateLimitRejection {
    pub scope: LimitScope,
    pub limit: u32,
    pub reset_at: u64,
}

/// Per-client throttling across a short window and a daily quota.
///
/// Constructed explicitly and shared (usually behind an `Arc`) with the
/// request pipeline; each instance owns its own counters.
#[derive(Debug, Default)]
pub struct RequestLimiter {
    policy: RateLimitPolicy,
    window: FixedWindowStore,
    daily: FixedWindowStore,
}

impl RequestLimiter {
    #[must_use]
    #[instrument(skip_all, fields(window_ms = policy.window.as_millis(), window_max = policy.window_max, daily_max = policy.daily_max))]
    pub fn new(policy: RateLimitPolicy) -> Self {
        debug!("creating request limiter");
        Self {
            policy,
            window: FixedWindowStore::new(),
            daily: FixedWindowStore::new(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Checks a request from `key` against both quotas.
    ///
    /// # Errors
    /// Returns [`RateLimitRejection`] when either quota is exhausted.
    pub fn check_request(&self, key: &str) -> Result<RateLimitDecision, RateLimitRejection> {
        self.check_request_at(key, now_millis())
    }

    /// Checks a request at the given time (epoch milliseconds).
    ///
    /// The short window is checked first and short-circuits on rejection; the
    /// daily quota is only consulted for requests the short window admits. On
    /// success the short-window decision is returned.
    ///
    /// # Errors
    /// Returns [`RateLimitRejection`] when either quota is exhausted.
    pub fn check_request_at(
        &self,
        key: &str,
        now: u64,
    ) -> Result<RateLimitDecision, RateLimitRejection> {
        let short = self
            .window
            .check_at(key, self.policy.window, self.policy.window_max, now);
        if !short.allowed {
            warn!(key, reset_at = short.reset_at, "request rejected by short window");
            return Err(RateLimitRejection {
                scope: LimitScope::Window,
                limit: self.policy.window_max,
                reset_at: short.reset_at,
            });
        }

        let daily = self
            .daily
            .check_at(key, DAILY_WINDOW, self.policy.daily_max, now);
        if !daily.allowed {
            warn!(key, reset_at = daily.reset_at, "request rejected by daily quota");
            return Err(RateLimitRejection {
                scope: LimitScope::Daily,
                limit: self.policy.daily_max,
                reset_at: daily.reset_at,
            });
        }

        debug!(
            key,
            remaining = short.remaining,
            daily_remaining = daily.remaining,
            "request admitted"
        );
        Ok(short)
    }

    /// Drops expired entries from both stores; returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(now_millis())
    }

    pub fn sweep_expired_at(&self, now: u64) -> usize {
        let removed = self.window.sweep_expired_at(now) + self.daily.sweep_expired_at(now);
        if removed > 0 {
            debug!(removed, "swept expired rate limit entries");
        }
        removed
    }

    /// Number of keys currently tracked by the short window and daily stores.
    #[must_use]
    pub fn tracked_keys(&self) -> (usize, usize) {
        (self.window.len(), self.daily.len())
    }
}

/// Spawns a task that sweeps expired entries every `every`.
///
/// The task runs until aborted or the runtime shuts down.
pub fn spawn_sweeper(limiter: Arc<RequestLimiter>, every: Duration) -> JoinHandle<()> {
    info!(interval_secs = every.as_secs(), "starting rate limit sweeper");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            limiter.sweep_expired();
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn policy(window_max: u32, daily_max: u32) -> RateLimitPolicy {
        RateLimitPolicy {
            window: Duration::from_millis(1000),
            window_max,
            daily_max,
        }
    }

    #[test]
    fn test_default_policy_values() {
        let policy = RateLimitPolicy::default();
        assert_eq!(policy.window, Duration::from_secs(60));
        assert_eq!(policy.window_max, 60);
        assert_eq!(policy.daily_max, 500);
    }

    #[test]
    fn test_admitted_request_reports_short_window_remaining() {
        let limiter = RequestLimiter::new(policy(3, 100));
        let decision = limiter.check_request_at("user:lan", 0).unwrap();
        assert_eq!(decision.remaining, 2);
        assert_eq!(decision.reset_at, 1000);
    }

    #[test]
    fn test_short_window_rejection_short_circuits() {
        let limiter = RequestLimiter::new(policy(1, 100));
        limiter.check_request_at("user:lan", 0).unwrap();

        let rejection = limiter.check_request_at("user:lan", 10).unwrap_err();
        assert_eq!(rejection.scope, LimitScope::Window);
        assert_eq!(rejection.limit, 1);
        assert_eq!(rejection.reset_at, 1000);

        // The rejected request never reached the daily store.
        let after_reset = limiter.check_request_at("user:lan", 1000).unwrap();
        assert!(after_reset.allowed);
        let mut daily_left = 0;
        for now in (2000..).step_by(1000).take(200) {
            match limiter.check_request_at("user:lan", now) {
                Ok(_) => daily_left += 1,
                Err(rejection) => {
                    assert_eq!(rejection.scope, LimitScope::Daily);
                    break;
                }
            }
        }
        assert_eq!(daily_left, 98, "only two admitted requests counted against the day");
    }

    #[test]
    fn test_daily_quota_rejects_across_windows() {
        let limiter = RequestLimiter::new(policy(10, 2));
        limiter.check_request_at("ip:10.0.0.1", 0).unwrap();
        limiter.check_request_at("ip:10.0.0.1", 5000).unwrap();

        let rejection = limiter.check_request_at("ip:10.0.0.1", 10_000).unwrap_err();
        assert_eq!(rejection.scope, LimitScope::Daily);
        assert_eq!(rejection.limit, 2);
        assert_eq!(rejection.reset_at, DAILY_WINDOW.as_millis() as u64);
    }

    #[test]
    fn test_clients_do_not_share_quota() {
        let limiter = RequestLimiter::new(policy(1, 1));
        limiter.check_request_at("user:a", 0).unwrap();
        assert!(limiter.check_request_at("user:a", 1).is_err());
        assert!(limiter.check_request_at("user:b", 1).is_ok());
    }

    #[test]
    fn test_rejection_message_names_scope() {
        let rejection = RateLimitRejection {
            scope: LimitScope::Daily,
            limit: 500,
            reset_at: 42,
        };
        assert_eq!(
            rejection.to_string(),
            "daily rate limit of 500 requests exceeded, retry at 42"
        );
    }

    #[test]
    fn test_sweep_clears_both_stores() {
        let limiter = RequestLimiter::new(policy(5, 5));
        limiter.check_request_at("user:a", 0).unwrap();
        assert_eq!(limiter.tracked_keys(), (1, 1));

        // short window expired, day has not
        assert_eq!(limiter.sweep_expired_at(5000), 1);
        assert_eq!(limiter.tracked_keys(), (0, 1));

        let day_later = DAILY_WINDOW.as_millis() as u64;
        assert_eq!(limiter.sweep_expired_at(day_later), 1);
        assert_eq!(limiter.tracked_keys(), (0, 0));
    }

    #[tokio::test]
    async fn test_sweeper_task_reclaims_expired_entries() {
        tokio::time::pause();

        let limiter = Arc::new(RequestLimiter::new(policy(5, 5)));
        // Time 0 is decades before the wall clock the sweeper uses.
        limiter.check_request_at("user:a", 0).unwrap();
        assert_eq!(limiter.tracked_keys(), (1, 1));

        let handle = spawn_sweeper(Arc::clone(&limiter), Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(limiter.tracked_keys(), (0, 0));
        handle.abort();
    }
}
