//! Limits enforced by `SearchIndexClient` before a request reaches the engine.

/// Largest bulk request accepted by default.
pub const DEFAULT_MAX_BATCH_SIZE: usize = 10_000;

/// Client-side request limits.
#[derive(Debug, Clone)]
pub struct SearchIndexConfig {
    /// Largest number of concept documents per bulk request; `None` means no cap.
    pub max_batch_size: Option<usize>,
}

impl Default for SearchIndexConfig {
    fn default() -> Self {
        Self::with_max_batch_size(DEFAULT_MAX_BATCH_SIZE)
    }
}

impl SearchIndexConfig {
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
        }
    }
}
