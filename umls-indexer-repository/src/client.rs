//! Search index client implementation.
//!
//! This module provides the main client for interacting with the search index.
//! The pipeline uses it to provision the destination index and to submit
//! bulk batches of concept documents.

use serde_json::Value;
use tracing::{info, warn};

use crate::config::SearchIndexConfig;
use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BatchOperationSummary, ExistingIndexPolicy, IndexProvisioning};
use umls_indexer_shared::ConceptDocument;

/// The main client for interacting with the search index.
pub struct SearchIndexClient {
    provider: Box<dyn SearchIndexProvider>,
    config: SearchIndexConfig,
}

impl SearchIndexClient {
    /// Create a new SearchIndexClient with default configuration.
    pub fn new(provider: Box<dyn SearchIndexProvider>) -> Self {
        Self {
            provider,
            config: SearchIndexConfig::default(),
        }
    }

    /// Create a new SearchIndexClient with custom configuration.
    pub fn with_config(provider: Box<dyn SearchIndexProvider>, config: SearchIndexConfig) -> Self {
        Self { provider, config }
    }

    /// The configuration this client validates against.
    pub fn config(&self) -> &SearchIndexConfig {
        &self.config
    }

    /// Check if batch size exceeds the configured limit.
    pub fn validate_batch_size(&self, size: usize) -> Result<(), SearchIndexError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchIndexError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Make sure `index` exists with `mapping` before ingestion begins.
    ///
    /// A missing index is always created. An existing one is handled according
    /// to `policy`: kept as is, dropped and recreated, or reported as an error.
    pub async fn ensure_index(
        &self,
        index: &str,
        mapping: &Value,
        policy: ExistingIndexPolicy,
    ) -> Result<IndexProvisioning, SearchIndexError> {
        if index.trim().is_empty() {
            return Err(SearchIndexError::validation("index name is required"));
        }
        if !mapping.is_object() {
            return Err(SearchIndexError::validation("index mapping must be a JSON object"));
        }

        if !self.provider.index_exists(index).await? {
            self.provider.create_index(index, mapping).await?;
            info!(index = %index, "Created index");
            return Ok(IndexProvisioning::Created);
        }

        match policy {
            ExistingIndexPolicy::Keep => {
                info!(index = %index, "Index exists, keeping it");
                Ok(IndexProvisioning::Kept)
            }
            ExistingIndexPolicy::Recreate => {
                warn!(index = %index, "Index exists, deleting and recreating it");
                self.provider.delete_index(index).await?;
                self.provider.create_index(index, mapping).await?;
                Ok(IndexProvisioning::Recreated)
            }
            ExistingIndexPolicy::Abort => Err(SearchIndexError::index_already_exists(index)),
        }
    }

    /// Submit one batch of documents through the provider's bulk API.
    ///
    /// The batch size is limited by the configured max_batch_size.
    /// Individual failures are reported in the summary.
    pub async fn batch_index(
        &self,
        documents: &[ConceptDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        self.validate_batch_size(documents.len())?;

        if let Some(doc) = documents.iter().find(|d| d.id.is_empty()) {
            return Err(SearchIndexError::validation(format!(
                "All documents must have an id (index {})",
                doc.index
            )));
        }

        self.provider.bulk_index_documents(documents).await
    }

    /// Check if the search engine is healthy.
    pub async fn health_check(&self) -> Result<bool, SearchIndexError> {
        self.provider.health_check().await
    }
}
