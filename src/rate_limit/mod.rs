//! Per-client request throttling with fixed time windows.
//!
//! [`RequestLimiter`] applies two independent quotas to every request: a
//! short burst window (60 requests per minute by default) and a daily quota
//! (500 per day by default). Counters are keyed by client identity, either
//! an authenticated user id or the client's network address.
//!
//! # Example
//!
//! ```
//! use van_tutor_core::rate_limit::{RateLimitPolicy, RequestLimiter};
//!
//! let limiter = RequestLimiter::new(RateLimitPolicy::default());
//! let decision = limiter.check_request("user:lan").unwrap();
//! assert_eq!(decision.remaining, 59);
//! ```
//!
//! Counters live in process memory only; separate processes keep separate
//! quotas.

mod limiter;
mod window;

pub use limiter::{
    DAILY_WINDOW, DEFAULT_DAILY_MAX, DEFAULT_WINDOW, DEFAULT_WINDOW_MAX, LimitScope,
    RateLimitPolicy, RateLimitRejection, RequestLimiter, spawn_sweeper,
};
pub use window::{FixedWindowStore, RateLimitDecision, now_millis};
