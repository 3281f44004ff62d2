//! # UMLS Indexer Pipeline
//!
//! This crate turns a UMLS `MRCONSO.RRF` extract into a lazy stream of concept
//! documents and bulk-loads them into a search index.
//!
//! ## Architecture
//!
//! The pipeline is pull-driven. The loader asks for the next batch and each
//! pull cascades backwards one line at a time:
//!
//! 1. **Source**: reads raw `|`-delimited lines from the extract
//! 2. **Schema**: decodes a raw line into a named, typed record
//! 3. **Processor**: projects records into documents, skipping malformed ones
//! 4. **Stream**: bounds the document sequence and reports progress
//! 5. **Loader**: submits documents to the search index in fixed-size batches
//! 6. **Orchestrator**: provisions the index and drives the flow

pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod processor;
pub mod schema;
pub mod source;
pub mod stream;

pub use errors::{FieldDecodeError, MalformedRecordError, PipelineError, RecordError};
