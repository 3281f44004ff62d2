//! # UMLS Indexer
//!
//! Main library for the UMLS concept indexer.
//!
//! This crate provides the configuration, logging setup and dependency
//! wiring for running the concept pipeline against a search cluster.

pub mod config;
pub mod logging;

pub use config::{Cli, Dependencies, IndexerSettings};

use thiserror::Error;

/// Errors that can occur during indexer initialization or execution.
#[derive(Error, Debug)]
pub enum IndexingError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Pipeline error.
    #[error("Pipeline error: {0}")]
    PipelineError(#[from] umls_indexer_pipeline::PipelineError),

    /// Search error.
    #[error("Search error: {0}")]
    SearchError(#[from] umls_indexer_repository::SearchIndexError),

    /// Malformed JSON in a config or mapping file.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl IndexingError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }
}
