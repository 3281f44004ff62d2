//! Search index provider trait definition.
//!
//! This module defines the abstract interface for search index operations,
//! allowing for different backend implementations (OpenSearch, Elasticsearch, etc.).

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::SearchIndexError;
use crate::types::BatchOperationSummary;
use umls_indexer_shared::ConceptDocument;

/// Abstracts the underlying search index implementation (OpenSearch, Elasticsearch, etc.).
///
/// Implementations are injected into `SearchIndexClient` to enable dependency
/// injection and easy testing with mock implementations.
///
/// All methods return `Result<T, SearchIndexError>` for consistent error handling across
/// different backend implementations.
#[async_trait]
pub trait SearchIndexProvider: Send + Sync {
    /// Check whether an index with the given name exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError>;

    /// Create an index from a settings/mappings body.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the index to create
    /// * `mapping` - Index body as accepted by the engine's create-index API
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchIndexError)` - If creation fails (including when it already exists)
    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), SearchIndexError>;

    /// Delete an index. Deleting a missing index is not an error.
    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError>;

    /// Index multiple documents in a single bulk request and return a summary of
    /// successful and failed operations.
    ///
    /// Each document carries its own destination index and id in its envelope.
    ///
    /// # Returns
    ///
    /// * `Ok(BatchOperationSummary)` - Contains aggregate statistics and individual results
    /// * `Err(SearchIndexError)` - If the bulk request fails entirely
    async fn bulk_index_documents(
        &self,
        documents: &[ConceptDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError>;

    /// Check if the search engine is healthy and reachable.
    async fn health_check(&self) -> Result<bool, SearchIndexError>;
}
