//! Short-window deduplication of identical prompts
//!
//! A prompt seen less than `window` ago is rejected. The cache is an explicit
//! object owned by the relay; check and record happen under one lock so two
//! identical concurrent requests cannot both pass.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Default dedup window in seconds
pub const DEFAULT_WINDOW_SECS: f64 = 2.0;

/// What the cache remembers after accepting a key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Clear every entry, then remember only the accepted key
    #[default]
    GlobalReset,
    /// Keep all keys, dropping only entries older than the window
    PerKey,
}

#[derive(Debug)]
pub struct DedupCache {
    window: Duration,
    policy: DedupPolicy,
    seen: Mutex<HashMap<String, Instant>>,
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(
            Duration::from_secs_f64(DEFAULT_WINDOW_SECS),
            DedupPolicy::default(),
        )
    }
}

impl DedupCache {
    pub fn new(window: Duration, policy: DedupPolicy) -> Self {
        Self {
            window,
            policy,
            seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn policy(&self) -> DedupPolicy {
        self.policy
    }

    /// True if `key` was recorded less than `window` before `now`
    pub fn should_reject(&self, key: &str, now: Instant) -> bool {
        let seen = self.lock();
        Self::is_recent(&seen, key, now, self.window)
    }

    /// Remember `key` as accepted at `now`
    pub fn record(&self, key: &str, now: Instant) {
        let mut seen = self.lock();
        self.insert(&mut seen, key, now);
    }

    /// Check and record under a single lock.
    ///
    /// Returns `true` when `key` is a duplicate; nothing is recorded in that case.
    pub fn check_and_record(&self, key: &str, now: Instant) -> bool {
        let mut seen = self.lock();
        if Self::is_recent(&seen, key, now, self.window) {
            tracing::debug!(key, "duplicate request rejected");
            return true;
        }
        self.insert(&mut seen, key, now);
        false
    }

    /// Number of remembered keys
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn is_recent(seen: &HashMap<String, Instant>, key: &str, now: Instant, window: Duration) -> bool {
        seen.get(key)
            .map(|&at| now.saturating_duration_since(at) < window)
            .unwrap_or(false)
    }

    fn insert(&self, seen: &mut HashMap<String, Instant>, key: &str, now: Instant) {
        match self.policy {
            DedupPolicy::GlobalReset => seen.clear(),
            DedupPolicy::PerKey => {
                let window = self.window;
                seen.retain(|_, at| now.saturating_duration_since(*at) < window);
            }
        }
        seen.insert(key.to_string(), now);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
