//! Tier lookup and write-through
//!
//! Lookup order for a viewer is local cache, then shared cache, then a
//! fresh cascade. Each tier is consulted at most once per request and
//! nothing is retried.

use crate::cache::{CacheStats, LocalCache};
use crate::cascade::CascadeOrchestrator;
use crate::error::{CacheError, Result};
use crate::model::{ResultSet, ViewerId};
use crate::shared::SharedCache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Where a result set was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Process-local cache
    Local,
    /// Shared cache, backfilled into the local tier
    Shared,
    /// Freshly computed, written through to both tiers
    Cascade,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Local => write!(f, "local"),
            Tier::Shared => write!(f, "shared"),
            Tier::Cascade => write!(f, "cascade"),
        }
    }
}

/// A resolved lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub results: ResultSet,
    pub tier: Tier,
}

/// Entry point of the cache layer
///
/// Owns the local cache behind a single lock and borrows the shared tier
/// and the cascade through explicit injection.
pub struct CacheCoordinator {
    local: Mutex<LocalCache>,
    shared: Arc<dyn SharedCache>,
    cascade: CascadeOrchestrator,
}

impl CacheCoordinator {
    pub fn new(
        local: LocalCache,
        shared: Arc<dyn SharedCache>,
        cascade: CascadeOrchestrator,
    ) -> Self {
        Self {
            local: Mutex::new(local),
            shared,
            cascade,
        }
    }

    /// Resolve a viewer's result set from the cheapest tier that has it
    ///
    /// Returns [`CacheError::NoData`] when nothing is cached and every
    /// source failed; neither tier is written in that case.
    pub async fn get_or_compute(&self, viewer: &ViewerId) -> Result<Resolution> {
        let local_hit = self.local.lock().await.get(viewer);
        if let Some(results) = local_hit {
            debug!("Data from local cache for {}", viewer);
            return Ok(Resolution {
                results,
                tier: Tier::Local,
            });
        }

        if let Some(results) = self.read_shared(viewer).await {
            debug!("Data from shared cache for {}", viewer);
            self.local.lock().await.set(viewer.clone(), results.clone());
            return Ok(Resolution {
                results,
                tier: Tier::Shared,
            });
        }

        info!("No cached data for {}. Running cascade", viewer);
        let results = self.cascade.run(viewer).await?;

        if results.is_empty() {
            warn!("Cascade produced no results for {}", viewer);
            return Err(CacheError::NoData {
                viewer: viewer.to_string(),
            });
        }

        self.local.lock().await.set(viewer.clone(), results.clone());
        self.write_shared(viewer, &results).await;

        Ok(Resolution {
            results,
            tier: Tier::Cascade,
        })
    }

    /// Local tier statistics
    pub async fn local_stats(&self) -> CacheStats {
        self.local.lock().await.stats()
    }

    /// Whether the local tier holds `viewer`, without touching recency
    pub async fn is_cached_locally(&self, viewer: &ViewerId) -> bool {
        self.local.lock().await.contains_key(viewer)
    }

    pub fn shared_backend(&self) -> &'static str {
        self.shared.backend()
    }

    pub fn cascade(&self) -> &CascadeOrchestrator {
        &self.cascade
    }

    /// Shared tier read; any failure or unusable value counts as a miss
    async fn read_shared(&self, viewer: &ViewerId) -> Option<ResultSet> {
        let raw = match self.shared.get(viewer.as_str()).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(viewer = %viewer, error = %e, "Shared cache read failed");
                return None;
            }
        };

        match ResultSet::from_json(&raw) {
            Ok(results) if !results.is_empty() => Some(results),
            Ok(_) => {
                debug!("Ignoring empty shared cache value for {}", viewer);
                None
            }
            Err(e) => {
                warn!(viewer = %viewer, error = %e, "Ignoring malformed shared cache value");
                None
            }
        }
    }

    /// Best-effort shared tier write
    async fn write_shared(&self, viewer: &ViewerId, results: &ResultSet) {
        let value = match results.to_json() {
            Ok(value) => value,
            Err(e) => {
                warn!(viewer = %viewer, error = %e, "Could not encode results for shared cache");
                return;
            }
        };

        if let Err(e) = self.shared.set(viewer.as_str(), value).await {
            warn!(viewer = %viewer, error = %e, "Shared cache write failed");
        }
    }
}
