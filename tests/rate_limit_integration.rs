//! Integration tests for the two-window request limiter.

use std::sync::Arc;
use std::time::Duration;

use van_tutor_core::rate_limit::{
    DAILY_WINDOW, FixedWindowStore, LimitScope, RateLimitPolicy, RequestLimiter,
};

/// max=2 within a 1s window: two admitted, third rejected with the same
/// reset time, fourth after the reset admitted with a new window.
#[test]
fn test_fixed_window_reset_sequence() {
    let store = FixedWindowStore::new();
    let window = Duration::from_millis(1000);
    let start = 1_700_000_000_000;

    let first = store.check_at("user:minh", window, 2, start);
    let second = store.check_at("user:minh", window, 2, start + 400);
    let third = store.check_at("user:minh", window, 2, start + 800);

    assert!(first.allowed && second.allowed);
    assert!(!third.allowed);
    assert_eq!(third.reset_at, first.reset_at);

    let fourth = store.check_at("user:minh", window, 2, third.reset_at + 1);
    assert!(fourth.allowed);
    assert_eq!(fourth.reset_at, third.reset_at + 1 + 1000);
}

/// Exhausting one client's quota leaves every other client untouched.
#[test]
fn test_distinct_clients_never_share_counters() {
    let limiter = RequestLimiter::new(RateLimitPolicy {
        window: Duration::from_secs(60),
        window_max: 3,
        daily_max: 10,
    });

    for _ in 0..3 {
        limiter.check_request_at("ip:203.0.113.1", 0).unwrap();
    }
    assert!(limiter.check_request_at("ip:203.0.113.1", 1).is_err());

    let other = limiter.check_request_at("ip:203.0.113.2", 1).unwrap();
    assert_eq!(other.remaining, 2);
    let user = limiter.check_request_at("user:203.0.113.1", 1).unwrap();
    assert_eq!(user.remaining, 2);
}

/// The daily quota outlasts many short windows.
#[test]
fn test_daily_quota_spans_short_windows() {
    let limiter = RequestLimiter::new(RateLimitPolicy {
        window: Duration::from_secs(60),
        window_max: 60,
        daily_max: 5,
    });

    let minute = 60_000;
    for i in 0..5 {
        limiter.check_request_at("user:an", i * minute).unwrap();
    }
    let rejection = limiter.check_request_at("user:an", 5 * minute).unwrap_err();
    assert_eq!(rejection.scope, LimitScope::Daily);
    assert_eq!(u128::from(rejection.reset_at), DAILY_WINDOW.as_millis());

    // a new day starts a new quota
    let next_day = limiter
        .check_request_at("user:an", rejection.reset_at)
        .unwrap();
    assert!(next_day.allowed);
}

/// Concurrent requests from one client are admitted exactly up to the cap.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_respect_cap() {
    let limiter = Arc::new(RequestLimiter::new(RateLimitPolicy {
        window: Duration::from_secs(60),
        window_max: 25,
        daily_max: 1000,
    }));

    let tasks: Vec<_> = (0..100)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            tokio::spawn(async move { limiter.check_request_at("user:burst", 42).is_ok() })
        })
        .collect();

    let mut admitted = 0;
    for task in tasks {
        if task.await.unwrap() {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 25);
}
