//! # Local Cache Tier
//!
//! A bounded, process-local map from viewer to result set.
//!
//! ## Features
//!
//! - **Absolute TTL**: an entry lives for `ttl` from its last write; reads do
//!   not extend it
//! - **Lazy Expiry**: expired entries are removed by the read that finds
//!   them, there is no background sweep
//! - **LRU Eviction**: inserting a new key at capacity evicts exactly the
//!   least recently used entry
//! - **Injected Clock**: time comes from a [`Clock`](crate::clock::Clock) so
//!   expiry can be tested deterministically
//!
//! ## Example
//!
//! ```rust
//! use invoker_cache::cache::{LocalCache, LocalCacheConfig};
//! use invoker_cache::model::{ResultSet, ScoreResult, ViewerId};
//! use std::time::Duration;
//!
//! # fn example() -> invoker_cache::Result<()> {
//! let config = LocalCacheConfig::builder()
//!     .max_size(1_000)
//!     .ttl(Duration::from_secs(30))
//!     .build();
//!
//! let mut cache = LocalCache::new(config)?;
//!
//! let viewer = ViewerId::parse("viewer-123")?;
//! let results = ResultSet::try_from(vec![ScoreResult::new("ModelA", 42)?])?;
//! cache.set(viewer.clone(), results);
//!
//! if let Some(hit) = cache.get(&viewer) {
//!     println!("Cache hit: {} results", hit.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod store;
pub mod types;

pub use config::{LocalCacheConfig, LocalCacheConfigBuilder};
pub use entry::CacheEntry;
pub use store::LocalCache;
pub use types::CacheStats;
