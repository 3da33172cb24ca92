//! Score source reached over HTTP

use crate::error::{CacheError, Result};
use crate::model::{ScoreResult, ViewerId};
use crate::source::{ScoreSource, SourceDescriptor};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Request body sent to a generator endpoint
#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model_name: &'a str,
    viewer_id: &'a str,
}

/// Response body returned by a generator endpoint
#[derive(Debug, Deserialize)]
struct GenerateResponse {
    reason: String,
    result: i64,
}

/// Calls a generator endpoint with a JSON POST
///
/// The response must name the same source that was asked for and carry an
/// in-range value; anything else counts as a failed call.
#[derive(Debug, Clone)]
pub struct HttpScoreSource {
    descriptor: SourceDescriptor,
    client: Client,
}

impl HttpScoreSource {
    /// Create a source sharing an existing HTTP client
    pub fn new(descriptor: SourceDescriptor, client: Client) -> Self {
        Self { descriptor, client }
    }

    pub fn url(&self) -> &str {
        &self.descriptor.url
    }
}

#[async_trait]
impl ScoreSource for HttpScoreSource {
    fn name(&self) -> &str {
        &self.descriptor.name
    }

    async fn call(&self, viewer: &ViewerId) -> Result<ScoreResult> {
        let body = GenerateRequest {
            model_name: &self.descriptor.name,
            viewer_id: viewer.as_str(),
        };

        debug!(source = %self.descriptor.name, viewer = %viewer, "calling score source");

        let response = self
            .client
            .post(&self.descriptor.url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: GenerateResponse = response.json().await.map_err(|e| CacheError::SourceFailed {
            source_name: self.descriptor.name.clone(),
            reason: format!("malformed response: {}", e),
        })?;

        if payload.reason != self.descriptor.name {
            return Err(CacheError::SourceFailed {
                source_name: self.descriptor.name.clone(),
                reason: format!("response names source {:?}", payload.reason),
            });
        }

        ScoreResult::new(payload.reason, payload.result)
    }
}
