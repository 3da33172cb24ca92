//! Configuration for the local cache tier

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the process-local cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCacheConfig {
    /// Maximum number of viewers held at once
    pub max_size: usize,

    /// Lifetime of an entry, measured from its last write
    pub ttl: Duration,
}

impl Default for LocalCacheConfig {
    fn default() -> Self {
        Self {
            max_size: 3,
            ttl: Duration::from_secs(10),
        }
    }
}

impl LocalCacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> LocalCacheConfigBuilder {
        LocalCacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_size == 0 {
            return Err(CacheError::Config(
                "max_size must be greater than 0".to_string(),
            ));
        }

        if self.ttl.is_zero() {
            return Err(CacheError::Config("ttl must be greater than 0".to_string()));
        }

        Ok(())
    }
}

/// Builder for local cache configuration
#[derive(Debug, Default)]
pub struct LocalCacheConfigBuilder {
    max_size: Option<usize>,
    ttl: Option<Duration>,
}

impl LocalCacheConfigBuilder {
    /// Set the entry capacity
    pub fn max_size(mut self, max: usize) -> Self {
        self.max_size = Some(max);
        self
    }

    /// Set the entry lifetime
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> LocalCacheConfig {
        let defaults = LocalCacheConfig::default();

        LocalCacheConfig {
            max_size: self.max_size.unwrap_or(defaults.max_size),
            ttl: self.ttl.unwrap_or(defaults.ttl),
        }
    }
}
