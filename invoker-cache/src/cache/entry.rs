//! Local cache entry with insertion time and recency tick

use crate::model::ResultSet;
use std::time::{Duration, Instant};

/// A cached result set for one viewer
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached value
    pub value: ResultSet,

    /// When the value was last written
    pub inserted_at: Instant,

    /// Position in the recency order; larger is more recent
    pub(crate) tick: u64,
}

impl CacheEntry {
    pub(crate) fn new(value: ResultSet, inserted_at: Instant, tick: u64) -> Self {
        Self {
            value,
            inserted_at,
            tick,
        }
    }

    /// Age of the entry at `now`
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.inserted_at)
    }

    /// An entry is live while its age is strictly below the ttl
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        self.age(now) >= ttl
    }
}
