//! Source module for the concept pipeline.
//!
//! Reads raw delimited lines from a UMLS extract on disk.

mod line_source;

pub use line_source::{LineSource, RawLine, SourceState, FIELD_DELIMITER};
