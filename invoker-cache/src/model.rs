//! Typed records shared by every tier: viewer ids, score results and result sets

use crate::error::{CacheError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest value a score source may report
pub const MIN_SCORE: i64 = 1;

/// Highest value a score source may report
pub const MAX_SCORE: i64 = 100;

/// Longest accepted viewer id, in bytes
pub const MAX_VIEWER_ID_LEN: usize = 256;

/// Opaque identifier of the viewer a recommendation is for
///
/// Used verbatim as the key in every cache tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ViewerId(String);

impl ViewerId {
    /// Validate and wrap a raw viewer id
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();

        if raw.trim().is_empty() {
            return Err(CacheError::InvalidViewerId("viewer id is empty".to_string()));
        }
        if raw.len() > MAX_VIEWER_ID_LEN {
            return Err(CacheError::InvalidViewerId(format!(
                "viewer id exceeds {} bytes",
                MAX_VIEWER_ID_LEN
            )));
        }
        if raw.chars().any(char::is_control) {
            return Err(CacheError::InvalidViewerId(
                "viewer id contains control characters".to_string(),
            ));
        }

        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ViewerId {
    type Error = CacheError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(raw)
    }
}

impl From<ViewerId> for String {
    fn from(id: ViewerId) -> Self {
        id.0
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single named value produced by one score source
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawScore")]
pub struct ScoreResult {
    source_name: String,
    value: i64,
}

/// Unvalidated wire shape, also accepting the legacy field names
#[derive(Deserialize)]
struct RawScore {
    #[serde(alias = "model_name")]
    source_name: String,
    #[serde(alias = "random_number")]
    value: i64,
}

impl TryFrom<RawScore> for ScoreResult {
    type Error = CacheError;

    fn try_from(raw: RawScore) -> Result<Self> {
        Self::new(raw.source_name, raw.value)
    }
}

impl ScoreResult {
    /// Create a validated score result
    pub fn new(source_name: impl Into<String>, value: i64) -> Result<Self> {
        let source_name = source_name.into();

        if source_name.trim().is_empty() {
            return Err(CacheError::InvalidScore("source name is empty".to_string()));
        }
        if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
            return Err(CacheError::InvalidScore(format!(
                "{} reported {}, outside [{}, {}]",
                source_name, value, MIN_SCORE, MAX_SCORE
            )));
        }

        Ok(Self { source_name, value })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn value(&self) -> i64 {
        self.value
    }
}

/// Results collected for one viewer, at most one per source name
///
/// Order carries no meaning; two sets are equal when they hold the same
/// `(source_name, value)` pairs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ScoreResult>", into = "Vec<ScoreResult>")]
pub struct ResultSet {
    results: Vec<ScoreResult>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result, refusing a second entry for the same source
    pub fn insert(&mut self, result: ScoreResult) -> Result<()> {
        if self.contains_source(result.source_name()) {
            return Err(CacheError::DuplicateSource(result.source_name));
        }
        self.results.push(result);
        Ok(())
    }

    pub fn contains_source(&self, source_name: &str) -> bool {
        self.results.iter().any(|r| r.source_name == source_name)
    }

    pub fn get(&self, source_name: &str) -> Option<&ScoreResult> {
        self.results.iter().find(|r| r.source_name == source_name)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoreResult> {
        self.results.iter()
    }

    /// Source names present in this set
    pub fn source_names(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.source_name()).collect()
    }

    /// Serialize for the shared cache tier
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a shared cache value, validating every record
    pub fn from_json(value: &str) -> Result<Self> {
        Ok(serde_json::from_str(value)?)
    }
}

impl TryFrom<Vec<ScoreResult>> for ResultSet {
    type Error = CacheError;

    fn try_from(results: Vec<ScoreResult>) -> Result<Self> {
        let mut set = ResultSet::new();
        for result in results {
            set.insert(result)?;
        }
        Ok(set)
    }
}

impl From<ResultSet> for Vec<ScoreResult> {
    fn from(set: ResultSet) -> Self {
        set.results
    }
}

impl PartialEq for ResultSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.results.iter().all(|r| other.get(r.source_name()) == Some(r))
    }
}

impl Eq for ResultSet {}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ScoreResult;
    type IntoIter = std::slice::Iter<'a, ScoreResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}
