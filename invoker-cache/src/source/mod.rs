//! Score sources: the independent providers a cascade fans out to

pub mod http;

use crate::error::Result;
use crate::model::{ScoreResult, ViewerId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use http::HttpScoreSource;

/// One external scoring provider
///
/// A call may take arbitrarily long or fail; the orchestrator bounds it
/// with a timeout and isolates its failure from sibling calls.
#[async_trait]
pub trait ScoreSource: Send + Sync {
    /// Name this source reports its results under
    fn name(&self) -> &str;

    /// Produce this source's score for a viewer
    async fn call(&self, viewer: &ViewerId) -> Result<ScoreResult>;
}

/// Name and call target of a configured source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub url: String,
}

impl SourceDescriptor {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}
