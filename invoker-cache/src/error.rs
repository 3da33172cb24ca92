//! Error types for cache and cascade operations
//!
//! Only `NoData` and `InvalidViewerId` are meant to reach the request
//! boundary. Source and shared-tier errors are recovered inside the
//! orchestrator and coordinator and only show up in logs.

use thiserror::Error;

/// Main error type for the invoker cache
#[derive(Error, Debug)]
pub enum CacheError {
    /// Viewer identifier failed validation
    #[error("Invalid viewer id: {0}")]
    InvalidViewerId(String),

    /// Score result failed validation
    #[error("Invalid score: {0}")]
    InvalidScore(String),

    /// Two results (or two configured sources) share a source name
    #[error("Duplicate source: {0}")]
    DuplicateSource(String),

    /// A score source call failed
    #[error("Source {source_name} failed: {reason}")]
    SourceFailed { source_name: String, reason: String },

    /// A score source call exceeded its timeout
    #[error("Source {source_name} timed out after {timeout_ms}ms")]
    Timeout { source_name: String, timeout_ms: u64 },

    /// Shared cache tier error
    #[error("Shared cache error: {0}")]
    SharedCache(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every source failed; nothing to return or cache
    #[error("No data generated for viewer {viewer}")]
    NoData { viewer: String },

    /// HTTP transport error (wrapper)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Redis driver error (wrapper)
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

impl CacheError {
    /// Whether this is the "all sources failed" outcome
    pub fn is_no_data(&self) -> bool {
        matches!(self, CacheError::NoData { .. })
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::Serialization(e.to_string())
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;
