//! Wiring of the cache layer from service configuration

use anyhow::{Context, Result};
use invoker_cache::{
    CacheCoordinator, CascadeOrchestrator, HttpScoreSource, InMemorySharedCache, LocalCache,
    RedisSharedCache, ScoreSource, SharedCache,
};
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ServiceConfig;

/// Build a coordinator with every collaborator the configuration describes
pub async fn build_coordinator(config: &ServiceConfig) -> Result<CacheCoordinator> {
    config.validate()?;

    let local = LocalCache::new(config.local_cache_config())?;
    let shared = build_shared_cache(config).await;
    let cascade = CascadeOrchestrator::new(build_sources(config)?, config.cascade_config())?;

    Ok(CacheCoordinator::new(local, shared, cascade))
}

/// One HTTP source per configured descriptor, sharing a client
pub fn build_sources(config: &ServiceConfig) -> Result<Vec<Arc<dyn ScoreSource>>> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("invoker/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    Ok(config
        .sources
        .iter()
        .map(|descriptor| {
            Arc::new(HttpScoreSource::new(descriptor.clone(), client.clone()))
                as Arc<dyn ScoreSource>
        })
        .collect())
}

/// Redis when enabled and reachable, otherwise process memory
async fn build_shared_cache(config: &ServiceConfig) -> Arc<dyn SharedCache> {
    if !config.redis.enabled {
        info!("Redis disabled, using in-memory shared cache");
        return Arc::new(InMemorySharedCache::new());
    }

    match RedisSharedCache::connect(config.redis_config()).await {
        Ok(redis) => Arc::new(redis),
        Err(e) => {
            warn!(
                error = %e,
                "Failed to connect to Redis. Falling back to in-memory shared cache."
            );
            Arc::new(InMemorySharedCache::new())
        }
    }
}
