//! Shared (second tier) cache
//!
//! The coordinator only needs string get/set against an external key/value
//! store. Values are JSON-encoded [`ResultSet`](crate::model::ResultSet)s;
//! decoding and validation happen in the coordinator, so adapters stay
//! oblivious to the payload.

pub mod redis_cache;

use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub use redis_cache::{RedisConfig, RedisSharedCache};

/// Key/value store used as the shared cache tier
///
/// Errors are reported, not hidden; the caller decides that a failed read
/// is a miss and a failed write is a no-op.
#[async_trait]
pub trait SharedCache: Send + Sync {
    /// Fetch the serialized value for `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a serialized value under `key`
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;
}

/// Shared tier kept in process memory
///
/// Used when no external store is configured, and in tests.
#[derive(Debug, Default)]
pub struct InMemorySharedCache {
    values: RwLock<HashMap<String, String>>,
}

impl InMemorySharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.values.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.read().await.is_empty()
    }
}

#[async_trait]
impl SharedCache for InMemorySharedCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
