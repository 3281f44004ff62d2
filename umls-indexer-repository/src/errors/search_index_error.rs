//! Errors raised while provisioning the concept index or submitting bulk batches.

use thiserror::Error;

/// Errors that can occur during search index operations.
#[derive(Debug, Clone, Error)]
pub enum SearchIndexError {
    /// A request was rejected before reaching the engine.
    #[error("Invalid request: {0}")]
    ValidationError(String),

    /// The cluster could not be reached or answered unexpectedly.
    #[error("Cannot reach search cluster: {0}")]
    ConnectionError(String),

    /// Creating or dropping the concept index failed.
    #[error("Index provisioning failed: {0}")]
    ProvisioningError(String),

    /// The index exists and the run is configured to abort in that case.
    #[error("Index '{0}' already exists (use the keep or recreate policy to reuse it)")]
    IndexAlreadyExists(String),

    /// A bulk request was refused as a whole.
    #[error("Bulk request failed: {0}")]
    BulkOperationError(String),

    /// More documents in one batch than the client allows.
    #[error("Batch of {provided} documents exceeds the limit of {max}")]
    BatchSizeExceeded { provided: usize, max: usize },

    /// A document could not be encoded or a response could not be decoded.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl SearchIndexError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }

    pub fn provisioning(msg: impl Into<String>) -> Self {
        Self::ProvisioningError(msg.into())
    }

    pub fn index_already_exists(index: impl Into<String>) -> Self {
        Self::IndexAlreadyExists(index.into())
    }

    pub fn bulk_operation(msg: impl Into<String>) -> Self {
        Self::BulkOperationError(msg.into())
    }

    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }
}
