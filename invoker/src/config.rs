//! Service configuration
//!
//! Resolution order, lowest to highest precedence: built-in defaults, the
//! optional YAML file, then environment variables and command-line flags.

use anyhow::{bail, Context, Result};
use clap::Args;
use invoker_cache::{CascadeConfig, LocalCacheConfig, RedisConfig, SourceDescriptor};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

const DEFAULT_GENERATOR_URL: &str = "http://generator-service:5000/generate";
const DEFAULT_MODELS: [&str; 5] = ["ModelA", "ModelB", "ModelC", "ModelD", "ModelE"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub host: String,
    pub port: u16,
    pub local_cache: LocalCacheSection,
    pub cascade: CascadeSection,
    pub redis: RedisSection,
    pub sources: Vec<SourceDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalCacheSection {
    pub max_size: usize,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeSection {
    pub call_timeout_ms: u64,
    pub deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisSection {
    /// When false the shared tier lives in process memory
    pub enabled: bool,
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub key_prefix: String,
    pub timeout_ms: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5001,
            local_cache: LocalCacheSection::default(),
            cascade: CascadeSection::default(),
            redis: RedisSection::default(),
            sources: DEFAULT_MODELS
                .iter()
                .map(|name| SourceDescriptor::new(*name, DEFAULT_GENERATOR_URL))
                .collect(),
        }
    }
}

impl Default for LocalCacheSection {
    fn default() -> Self {
        let defaults = LocalCacheConfig::default();
        Self {
            max_size: defaults.max_size,
            ttl_secs: defaults.ttl.as_secs(),
        }
    }
}

impl Default for CascadeSection {
    fn default() -> Self {
        let defaults = CascadeConfig::default();
        Self {
            call_timeout_ms: defaults.call_timeout.as_millis() as u64,
            deadline_ms: None,
        }
    }
}

impl Default for RedisSection {
    fn default() -> Self {
        let defaults = RedisConfig::default();
        Self {
            enabled: true,
            host: defaults.host,
            port: defaults.port,
            username: None,
            password: None,
            key_prefix: defaults.key_prefix,
            timeout_ms: defaults.timeout.as_millis() as u64,
        }
    }
}

/// Overrides taken from flags or the environment
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigOverrides {
    /// Host to bind to
    #[arg(long, env = "INVOKER_HOST")]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long, env = "INVOKER_PORT")]
    pub port: Option<u16>,

    /// Local cache capacity (viewers)
    #[arg(long, env = "LOCAL_CACHE_MAX_SIZE")]
    pub local_cache_max_size: Option<usize>,

    /// Local cache entry lifetime in seconds
    #[arg(long, env = "LOCAL_CACHE_TTL_SECS")]
    pub local_cache_ttl_secs: Option<u64>,

    /// Per-source call timeout in milliseconds
    #[arg(long, env = "CASCADE_CALL_TIMEOUT_MS")]
    pub call_timeout_ms: Option<u64>,

    /// Whole-cascade deadline in milliseconds
    #[arg(long, env = "CASCADE_DEADLINE_MS")]
    pub deadline_ms: Option<u64>,

    /// Use Redis for the shared tier
    #[arg(long, env = "REDIS_ENABLED")]
    pub redis_enabled: Option<bool>,

    #[arg(long, env = "REDIS_HOST")]
    pub redis_host: Option<String>,

    #[arg(long, env = "REDIS_PORT")]
    pub redis_port: Option<u16>,

    #[arg(long, env = "REDIS_USERNAME")]
    pub redis_username: Option<String>,

    #[arg(long, env = "REDIS_PASSWORD", hide_env_values = true)]
    pub redis_password: Option<String>,

    #[arg(long, env = "REDIS_KEY_PREFIX")]
    pub redis_key_prefix: Option<String>,

    #[arg(long, env = "REDIS_TIMEOUT_MS")]
    pub redis_timeout_ms: Option<u64>,
}

impl ServiceConfig {
    /// Load defaults, then the YAML file if one is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file {:?}", path))?;
                Self::from_yaml(&content)
                    .with_context(|| format!("Failed to parse config file {:?}", path))
            }
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply flag and environment overrides on top of the loaded values
    pub fn apply(&mut self, overrides: &ConfigOverrides) {
        let o = overrides.clone();

        if let Some(host) = o.host {
            self.host = host;
        }
        if let Some(port) = o.port {
            self.port = port;
        }
        if let Some(max_size) = o.local_cache_max_size {
            self.local_cache.max_size = max_size;
        }
        if let Some(ttl) = o.local_cache_ttl_secs {
            self.local_cache.ttl_secs = ttl;
        }
        if let Some(timeout) = o.call_timeout_ms {
            self.cascade.call_timeout_ms = timeout;
        }
        if let Some(deadline) = o.deadline_ms {
            self.cascade.deadline_ms = Some(deadline);
        }
        if let Some(enabled) = o.redis_enabled {
            self.redis.enabled = enabled;
        }
        if let Some(host) = o.redis_host {
            self.redis.host = host;
        }
        if let Some(port) = o.redis_port {
            self.redis.port = port;
        }
        if o.redis_username.is_some() {
            self.redis.username = o.redis_username;
        }
        if o.redis_password.is_some() {
            self.redis.password = o.redis_password;
        }
        if let Some(prefix) = o.redis_key_prefix {
            self.redis.key_prefix = prefix;
        }
        if let Some(timeout) = o.redis_timeout_ms {
            self.redis.timeout_ms = timeout;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.local_cache_config().validate()?;
        self.cascade_config().validate()?;

        if self.redis.enabled && self.redis.timeout_ms == 0 {
            bail!("redis.timeout_ms must be greater than 0");
        }

        if self.sources.is_empty() {
            bail!("at least one score source must be configured");
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.name.trim().is_empty() {
                bail!("score source names must not be empty");
            }
            if !seen.insert(source.name.as_str()) {
                bail!("score source {:?} is configured twice", source.name);
            }
            reqwest::Url::parse(&source.url)
                .with_context(|| format!("invalid url for score source {:?}", source.name))?;
        }

        Ok(())
    }

    pub fn local_cache_config(&self) -> LocalCacheConfig {
        LocalCacheConfig::builder()
            .max_size(self.local_cache.max_size)
            .ttl(Duration::from_secs(self.local_cache.ttl_secs))
            .build()
    }

    pub fn cascade_config(&self) -> CascadeConfig {
        CascadeConfig {
            call_timeout: Duration::from_millis(self.cascade.call_timeout_ms),
            deadline: self.cascade.deadline_ms.map(Duration::from_millis),
        }
    }

    pub fn redis_config(&self) -> RedisConfig {
        RedisConfig {
            host: self.redis.host.clone(),
            port: self.redis.port,
            username: self.redis.username.clone(),
            password: self.redis.password.clone(),
            key_prefix: self.redis.key_prefix.clone(),
            timeout: Duration::from_millis(self.redis.timeout_ms),
        }
    }

    /// Copy safe to print, with the Redis password masked
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.redis.password.is_some() {
            copy.redis.password = Some("********".to_string());
        }
        copy
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
