//! Fixed-window request counters keyed by client identity.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use tracing::{debug, instrument};

/// Counter state for one key in one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WindowEntry {
    count: u32,
    /// Epoch milliseconds after which the window has expired.
    reset_at: u64,
}

/// Result of checking one key against one window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    /// Epoch milliseconds at which the current window resets.
    pub reset_at: u64,
}

/// Keyed fixed-window counters.
///
/// The check-then-update sequence for a key runs while holding that key's
/// `DashMap` shard lock, so two concurrent requests for the same key can
/// never both observe room under the cap.
///
/// Entries are only replaced when the same key returns after its window has
/// passed; [`sweep_expired_at`](Self::sweep_expired_at) reclaims the rest.
#[derive(Debug, Default)]
pub struct FixedWindowStore {
    entries: DashMap<String, WindowEntry>,
}

impl FixedWindowStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks `key` against a window of `window` length capped at `max`
    /// requests, using the current wall clock.
    pub fn check(&self, key: &str, window: Duration, max: u32) -> RateLimitDecision {
        self.check_at(key, window, max, now_millis())
    }

    /// Checks `key` at the given time (epoch milliseconds).
    ///
    /// - no entry, or the entry expired: start a new window with count 1
    /// - count already at `max`: reject without consuming quota
    /// - otherwise: increment the count
    #[instrument(skip(self), level = "trace")]
    pub fn check_at(&self, key: &str, window: Duration, max: u32, now: u64) -> RateLimitDecision {
        let window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        let fresh = WindowEntry {
            count: 1,
            reset_at: now.saturating_add(window_ms),
        };

        match self.entries.entry(key.to_string()) {
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                allowed(max, fresh)
            }
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if entry.reset_at <= now {
                    *entry = fresh;
                    allowed(max, fresh)
                } else if entry.count >= max {
                    debug!(key, count = entry.count, max, "window exhausted");
                    RateLimitDecision {
                        allowed: false,
                        remaining: 0,
                        reset_at: entry.reset_at,
                    }
                } else {
                    entry.count += 1;
                    allowed(max, *entry)
                }
            }
        }
    }

    /// Removes entries whose window ended at or before `now`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep_expired_at(&self, now: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.reset_at > now);
        before.saturating_sub(self.entries.len())
    }

    /// Number of tracked keys, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn allowed(max: u32, entry: WindowEntry) -> RateLimitDecision {
    RateLimitDecision {
        allowed: true,
        remaining: max.saturating_sub(entry.count),
        reset_at: entry.reset_at,
    }
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}
