//! Redis-backed shared cache tier

use crate::error::{CacheError, Result};
use crate::shared::SharedCache;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ConnectionAddr, ConnectionInfo, RedisConnectionInfo};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings for the Redis shared tier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,

    /// Prepended to every viewer key; empty keeps bare viewer ids
    pub key_prefix: String,

    /// Upper bound for connecting and for each command
    pub timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            username: None,
            password: None,
            key_prefix: String::new(),
            timeout: Duration::from_secs(1),
        }
    }
}

impl RedisConfig {
    /// Full Redis key for a viewer key
    pub fn key_for(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(self.host.clone(), self.port),
            redis: RedisConnectionInfo {
                username: self.username.clone(),
                password: self.password.clone(),
                ..Default::default()
            },
        }
    }
}

/// Shared tier stored in Redis with plain GET/SET
///
/// No expiry is set on written keys.
#[derive(Clone)]
pub struct RedisSharedCache {
    conn: ConnectionManager,
    config: RedisConfig,
}

impl RedisSharedCache {
    /// Connect to Redis, failing if the server is unreachable within the timeout
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        info!("Connecting to Redis at {}:{}", config.host, config.port);

        let client = redis::Client::open(config.connection_info())?;
        let conn = tokio::time::timeout(config.timeout, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                CacheError::SharedCache(format!(
                    "connecting to {}:{} timed out after {:?}",
                    config.host, config.port, config.timeout
                ))
            })??;

        info!("Successfully connected to Redis");
        Ok(Self { conn, config })
    }

    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    async fn bounded<T>(
        &self,
        op: &str,
        fut: impl Future<Output = redis::RedisResult<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.config.timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CacheError::SharedCache(format!(
                "{} timed out after {:?}",
                op, self.config.timeout
            ))),
        }
    }
}

#[async_trait]
impl SharedCache for RedisSharedCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = self.config.key_for(key);
        let mut conn = self.conn.clone();

        let value = self
            .bounded("GET", conn.get::<_, Option<String>>(&key))
            .await?;
        debug!(key = %key, hit = value.is_some(), "redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let key = self.config.key_for(key);
        let mut conn = self.conn.clone();

        self.bounded("SET", conn.set::<_, _, ()>(&key, value)).await?;
        debug!(key = %key, "redis SET");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
