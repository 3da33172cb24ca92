//! Concurrent fan-out to every configured score source

use crate::error::{CacheError, Result};
use crate::model::{ResultSet, ScoreResult, ViewerId};
use crate::source::ScoreSource;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{info, warn};

/// Timing limits for a cascade run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeConfig {
    /// Upper bound for a single source call
    pub call_timeout: Duration,

    /// Upper bound for the whole run; calls still pending are aborted.
    /// `None` waits for every call to finish or time out.
    pub deadline: Option<Duration>,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(5),
            deadline: None,
        }
    }
}

impl CascadeConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.call_timeout.is_zero() {
            return Err(CacheError::Config(
                "call_timeout must be greater than 0".to_string(),
            ));
        }

        if self.deadline.is_some_and(|d| d.is_zero()) {
            return Err(CacheError::Config(
                "deadline must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}

/// Runs all score sources for a viewer at once and keeps the successes
///
/// One failed, slow or malformed source never affects its siblings. A run
/// where nothing succeeds yields an empty set, not an error.
pub struct CascadeOrchestrator {
    sources: Vec<Arc<dyn ScoreSource>>,
    config: CascadeConfig,
}

impl CascadeOrchestrator {
    /// Create an orchestrator; source names must be unique
    pub fn new(sources: Vec<Arc<dyn ScoreSource>>, config: CascadeConfig) -> Result<Self> {
        config.validate()?;

        {
            let mut seen = HashSet::new();
            for source in &sources {
                if !seen.insert(source.name()) {
                    return Err(CacheError::DuplicateSource(source.name().to_string()));
                }
            }
        }

        info!(
            "Initializing cascade with {} sources (call_timeout: {:?}, deadline: {:?})",
            sources.len(),
            config.call_timeout,
            config.deadline
        );

        Ok(Self { sources, config })
    }

    pub fn config(&self) -> &CascadeConfig {
        &self.config
    }

    pub fn source_names(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Call every source for `viewer` concurrently and collect the results
    ///
    /// Returns once every call has completed, failed or timed out, or once
    /// the configured deadline passes. Errors only when two results claim
    /// the same source, which indicates a misbehaving source.
    pub async fn run(&self, viewer: &ViewerId) -> Result<ResultSet> {
        let started = tokio::time::Instant::now();
        let call_timeout = self.config.call_timeout;

        let mut tasks = JoinSet::new();
        for source in &self.sources {
            let source = Arc::clone(source);
            let viewer = viewer.clone();

            tasks.spawn(async move {
                let name = source.name().to_string();
                let outcome = match tokio::time::timeout(call_timeout, source.call(&viewer)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(CacheError::Timeout {
                        source_name: name.clone(),
                        timeout_ms: call_timeout.as_millis() as u64,
                    }),
                };
                (name, outcome)
            });
        }

        let deadline = self.config.deadline.map(|d| started + d);
        let mut results = ResultSet::new();
        let mut failed = 0usize;

        loop {
            let joined = match deadline {
                Some(at) => match tokio::time::timeout_at(at, tasks.join_next()).await {
                    Ok(joined) => joined,
                    Err(_) => {
                        let outstanding = tasks.len();
                        warn!(
                            viewer = %viewer,
                            outstanding,
                            "Cascade deadline reached, aborting pending source calls"
                        );
                        tasks.abort_all();
                        failed += outstanding;
                        break;
                    }
                },
                None => tasks.join_next().await,
            };

            let Some(joined) = joined else {
                break;
            };

            match joined {
                Ok((name, Ok(score))) => {
                    if let Err(reason) = check_attribution(&name, &score) {
                        warn!(source = %name, viewer = %viewer, "{}", reason);
                        failed += 1;
                        continue;
                    }
                    results.insert(score)?;
                }
                Ok((name, Err(e))) => {
                    warn!(source = %name, viewer = %viewer, error = %e, "Score source call failed");
                    failed += 1;
                }
                Err(e) => {
                    warn!(viewer = %viewer, error = %e, "Score source task did not complete");
                    failed += 1;
                }
            }
        }

        info!(
            viewer = %viewer,
            succeeded = results.len(),
            failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Cascade complete"
        );

        Ok(results)
    }
}

/// A source may only report results under its own name
fn check_attribution(name: &str, score: &ScoreResult) -> std::result::Result<(), String> {
    if score.source_name() == name {
        Ok(())
    } else {
        Err(format!(
            "Score source returned a result for {:?}",
            score.source_name()
        ))
    }
}
