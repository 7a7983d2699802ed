//! Expiring result cache.
//!
//! The engine itself never caches — it is a pure function. The surrounding
//! system caches computed timelines (and upstream auth tokens) in an explicit
//! cache object with a TTL, owned by the calling layer and passed by handle,
//! never as hidden global state.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::DayTimeline;

/// A TTL'd key-value cache.
///
/// Entries expire `ttl` after insertion. Expired entries are dropped lazily
/// on access and eagerly via [`ExpiringCache::prune_expired`].
#[derive(Debug)]
pub struct ExpiringCache<T> {
    ttl: Duration,
    entries: HashMap<String, (Instant, T)>,
}

/// Cache of computed day timelines, keyed by [`day_key`].
pub type TimelineCache = ExpiringCache<DayTimeline>;

/// Cache key for one technician-day.
pub fn day_key(technician_id: &str, date: NaiveDate) -> String {
    format!("{technician_id}:{date}")
}

impl<T> ExpiringCache<T> {
    /// Create a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get a live entry, dropping it if expired.
    pub fn get(&mut self, key: &str) -> Option<&T> {
        let expired = match self.entries.get(key) {
            Some((stored_at, _)) => stored_at.elapsed() >= self.ttl,
            None => return None,
        };
        if expired {
            self.entries.remove(key);
            return None;
        }
        self.entries.get(key).map(|(_, value)| value)
    }

    /// Insert or replace an entry, resetting its clock.
    pub fn insert(&mut self, key: String, value: T) {
        self.entries.insert(key, (Instant::now(), value));
    }

    /// Drop a single entry.
    pub fn invalidate(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry whose key starts with `prefix` (e.g. one
    /// technician's days after their configuration changed).
    pub fn invalidate_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key.starts_with(prefix));
        before - self.entries.len()
    }

    /// Drop all expired entries.
    pub fn prune_expired(&mut self) {
        let ttl = self.ttl;
        self.entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries, including not-yet-pruned expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
