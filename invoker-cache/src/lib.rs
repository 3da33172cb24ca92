//! # Invoker Cache (invoker-cache)
//!
//! Tiered caching for per-viewer recommendation results.
//!
//! ## Features
//!
//! - Bounded local cache with LRU eviction and lazy TTL expiry
//! - Shared second tier behind a trait, with Redis and in-memory adapters
//! - Concurrent cascade over independent score sources with per-call
//!   timeouts and an optional overall deadline
//! - Write-through to both tiers; empty results are never cached
//!
//! ## Example
//!
//! ```no_run
//! use invoker_cache::{
//!     CacheCoordinator, CascadeConfig, CascadeOrchestrator, HttpScoreSource,
//!     InMemorySharedCache, LocalCache, LocalCacheConfig, ScoreSource, SourceDescriptor,
//!     ViewerId,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = reqwest::Client::new();
//!     let sources: Vec<Arc<dyn ScoreSource>> = ["ModelA", "ModelB"]
//!         .into_iter()
//!         .map(|name| {
//!             let descriptor = SourceDescriptor::new(name, "http://generator-service:5000/generate");
//!             Arc::new(HttpScoreSource::new(descriptor, client.clone())) as Arc<dyn ScoreSource>
//!         })
//!         .collect();
//!
//!     let coordinator = CacheCoordinator::new(
//!         LocalCache::new(LocalCacheConfig::default())?,
//!         Arc::new(InMemorySharedCache::new()),
//!         CascadeOrchestrator::new(sources, CascadeConfig::default())?,
//!     );
//!
//!     let viewer = ViewerId::parse("123")?;
//!     let resolution = coordinator.get_or_compute(&viewer).await?;
//!     println!("{} results from {} tier", resolution.results.len(), resolution.tier);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod cascade;
pub mod clock;
pub mod coordinator;
pub mod error;
pub mod model;
pub mod shared;
pub mod source;

// Re-export main types for convenience
pub use cache::{CacheStats, LocalCache, LocalCacheConfig, LocalCacheConfigBuilder};
pub use cascade::{CascadeConfig, CascadeOrchestrator};
pub use clock::{Clock, ManualClock, SystemClock};
pub use coordinator::{CacheCoordinator, Resolution, Tier};
pub use error::{CacheError, Result};
pub use model::{ResultSet, ScoreResult, ViewerId, MAX_SCORE, MIN_SCORE};
pub use shared::{InMemorySharedCache, RedisConfig, RedisSharedCache, SharedCache};
pub use source::{HttpScoreSource, ScoreSource, SourceDescriptor};
