//! Bounded local cache with LRU eviction and lazy TTL expiry

use crate::cache::{config::LocalCacheConfig, entry::CacheEntry, types::CacheStats};
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::model::{ResultSet, ViewerId};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, info};

/// Process-local cache of result sets keyed by viewer
///
/// - Never holds more than `max_size` entries
/// - Entries whose age reaches `ttl` are dropped by the read that finds them
/// - Every hit and every write moves the key to most-recently-used
///
/// The cache is not synchronized. Callers sharing one instance must guard it
/// with a lock.
pub struct LocalCache {
    config: LocalCacheConfig,
    clock: Arc<dyn Clock>,

    /// Main storage: key -> entry
    entries: HashMap<ViewerId, CacheEntry>,

    /// Recency index: tick -> key, least recent first
    recency: BTreeMap<u64, ViewerId>,

    next_tick: u64,
    stats: CacheStats,
}

impl LocalCache {
    /// Create a cache reading time from the system clock
    pub fn new(config: LocalCacheConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache with an injected clock
    pub fn with_clock(config: LocalCacheConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;
        info!(
            "Initializing local cache (max_size: {}, ttl: {:?})",
            config.max_size, config.ttl
        );

        Ok(Self {
            config,
            clock,
            entries: HashMap::new(),
            recency: BTreeMap::new(),
            next_tick: 0,
            stats: CacheStats::default(),
        })
    }

    pub fn config(&self) -> &LocalCacheConfig {
        &self.config
    }

    /// Look up a viewer's result set
    pub fn get(&mut self, key: &ViewerId) -> Option<ResultSet> {
        let now = self.clock.now();

        let Some(entry) = self.entries.get(key) else {
            debug!("Local cache miss: {}", key);
            self.stats.misses += 1;
            return None;
        };

        if entry.is_expired(now, self.config.ttl) {
            debug!("Local cache entry expired: {}", key);
            self.remove_entry(key);
            self.stats.misses += 1;
            self.stats.evictions_ttl += 1;
            return None;
        }

        let value = entry.value.clone();
        self.touch(key);
        self.stats.hits += 1;

        debug!("Local cache hit: {}", key);
        Some(value)
    }

    /// Store a viewer's result set, evicting the least recently used entry
    /// when a new key arrives at capacity
    pub fn set(&mut self, key: ViewerId, value: ResultSet) {
        let now = self.clock.now();

        if let Some(entry) = self.entries.get_mut(&key) {
            debug!("Updating local cache entry: {}", key);
            entry.value = value;
            entry.inserted_at = now;
            self.touch(&key);
            return;
        }

        if self.entries.len() >= self.config.max_size {
            self.evict_lru();
        }

        debug!("Inserting local cache entry: {}", key);
        let tick = self.bump_tick();
        self.recency.insert(tick, key.clone());
        self.entries.insert(key, CacheEntry::new(value, now, tick));
        self.stats.entries = self.entries.len();
    }

    /// Check presence without affecting recency or expiry
    pub fn contains_key(&self, key: &ViewerId) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a specific entry
    pub fn remove(&mut self, key: &ViewerId) -> Option<ResultSet> {
        self.remove_entry(key).map(|entry| entry.value)
    }

    /// Clear all entries from the cache
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.recency.clear();
        self.stats.entries = 0;

        info!("Cleared {} entries from local cache", count);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.clone()
    }

    /// Keys from least to most recently used
    pub fn keys_by_recency(&self) -> Vec<ViewerId> {
        self.recency.values().cloned().collect()
    }

    fn bump_tick(&mut self) -> u64 {
        let tick = self.next_tick;
        self.next_tick += 1;
        tick
    }

    /// Mark an existing key as most recently used
    fn touch(&mut self, key: &ViewerId) {
        let tick = self.bump_tick();
        if let Some(entry) = self.entries.get_mut(key) {
            self.recency.remove(&entry.tick);
            entry.tick = tick;
            self.recency.insert(tick, key.clone());
        }
    }

    fn remove_entry(&mut self, key: &ViewerId) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(&entry.tick);
        self.stats.entries = self.entries.len();
        Some(entry)
    }

    fn evict_lru(&mut self) {
        if let Some((_, key)) = self.recency.pop_first() {
            debug!("Evicting least recently used entry: {}", key);
            self.entries.remove(&key);
            self.stats.entries = self.entries.len();
            self.stats.evictions_lru += 1;
        }
    }
}
