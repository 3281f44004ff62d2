//! OpenSearch implementation of the search index provider.
//!
//! This module provides a concrete implementation of `SearchIndexProvider`
//! using OpenSearch as the backend, plus the default index mapping.

mod client;
pub mod index_config;

pub use client::OpenSearchClient;
pub use index_config::{default_mapping, legacy_doc_type, DEFAULT_INDEX_NAME};
