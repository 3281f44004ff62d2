//! Error types for the concept pipeline.
//!
//! `PipelineError` is fatal to a run. `RecordError` and its two causes are
//! per-line failures that the processor recovers from by skipping the line.

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;
use umls_indexer_repository::SearchIndexError;

/// Errors that stop the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The source extract could not be opened or read.
    #[error("Source error ({path}): {source}")]
    SourceError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the loader component.
    #[error("Loader error: {0}")]
    LoaderError(String),

    /// Error from the search index.
    #[error("Search index error: {0}")]
    SearchError(#[from] SearchIndexError),

    /// The run was interrupted before the stream was exhausted.
    #[error("Pipeline cancelled")]
    Cancelled,
}

impl PipelineError {
    /// Create a source I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::SourceError {
            path: path.into(),
            source,
        }
    }

    /// Create a loader error.
    pub fn loader(msg: impl Into<String>) -> Self {
        Self::LoaderError(msg.into())
    }
}

/// A non-empty column could not be decoded with its field's kind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot decode field {field} from '{value}': {source}")]
pub struct FieldDecodeError {
    /// Schema name of the offending column.
    pub field: String,
    /// Raw column text.
    pub value: String,
    #[source]
    pub source: ParseIntError,
}

impl FieldDecodeError {
    /// Create a decode error for `field`.
    pub fn new(field: impl Into<String>, value: impl Into<String>, source: ParseIntError) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
            source,
        }
    }
}

/// A parsed record lacks fields needed to build a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Record is missing required fields: {}", missing.join(", "))]
pub struct MalformedRecordError {
    /// Names of the required fields that were absent or empty.
    pub missing: Vec<String>,
}

/// Why a single line could not become a document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A column failed to decode.
    #[error(transparent)]
    Decode(#[from] FieldDecodeError),

    /// The decoded record is missing required fields.
    #[error(transparent)]
    Malformed(#[from] MalformedRecordError),
}
