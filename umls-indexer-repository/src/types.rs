//! Request and response types for search index operations.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::SearchIndexError;

/// What to do when the destination index already exists at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExistingIndexPolicy {
    /// Keep the existing index and its mapping; index into it.
    Keep,
    /// Delete the existing index and create it again from the mapping.
    Recreate,
    /// Refuse to start.
    #[default]
    Abort,
}

impl FromStr for ExistingIndexPolicy {
    type Err = SearchIndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "recreate" => Ok(Self::Recreate),
            "abort" => Ok(Self::Abort),
            other => Err(SearchIndexError::validation(format!(
                "Unknown existing-index policy '{}' (expected keep, recreate or abort)",
                other
            ))),
        }
    }
}

impl fmt::Display for ExistingIndexPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Keep => "keep",
            Self::Recreate => "recreate",
            Self::Abort => "abort",
        };
        f.write_str(name)
    }
}

/// Outcome of index provisioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexProvisioning {
    /// The index did not exist and was created.
    Created,
    /// The index existed and was left untouched.
    Kept,
    /// The index existed and was dropped and created again.
    Recreated,
}

/// Result of a batch operation for a single document.
///
/// This struct represents the outcome of indexing one document within a bulk
/// request. It indicates whether the operation succeeded and includes the
/// engine's error reason if it failed.
#[derive(Debug, Clone)]
pub struct BatchOperationResult {
    /// The document id (AUI).
    pub id: String,
    /// Whether the operation succeeded.
    pub success: bool,
    /// Error reason reported by the engine if the operation failed.
    pub error: Option<String>,
}

/// Summary of a batch operation containing aggregate statistics and individual results.
///
/// Partial failures are reported here rather than as an `Err`, so callers can
/// log them and keep going.
#[derive(Debug, Clone, Default)]
pub struct BatchOperationSummary {
    /// Total number of documents in the batch.
    pub total: usize,
    /// Number of successful operations.
    pub succeeded: usize,
    /// Number of failed operations.
    pub failed: usize,
    /// Individual results for each document.
    pub results: Vec<BatchOperationResult>,
}

impl BatchOperationSummary {
    /// Summary of an empty batch.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a summary from per-document results.
    pub fn from_results(results: Vec<BatchOperationResult>) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            results,
        }
    }

    /// Iterate over the failed results only.
    pub fn failures(&self) -> impl Iterator<Item = &BatchOperationResult> {
        self.results.iter().filter(|r| !r.success)
    }
}
