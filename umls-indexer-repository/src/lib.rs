//! # UMLS Indexer Repository
//!
//! This crate provides the search index interface used by the concept
//! pipeline: index provisioning and bulk submission. It includes the error
//! types, the `SearchIndexProvider` trait, the `SearchIndexClient` that
//! validates requests before handing them to a provider, and a concrete
//! implementation for OpenSearch.

pub mod client;
pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod types;

pub use client::SearchIndexClient;
pub use config::SearchIndexConfig;
pub use errors::SearchIndexError;
pub use interfaces::SearchIndexProvider;
pub use opensearch::OpenSearchClient;
pub use types::{BatchOperationResult, BatchOperationSummary, ExistingIndexPolicy, IndexProvisioning};
