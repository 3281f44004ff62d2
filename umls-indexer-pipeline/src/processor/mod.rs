//! Processor module for the concept pipeline.
//!
//! Projects decoded records into concept documents and recovers from
//! malformed lines by skipping them.

mod concept_processor;
mod skip_malformed;

pub use concept_processor::{ConceptProcessor, REQUIRED_FIELDS};
pub use skip_malformed::{SkipMalformed, SkipMalformedExt, TryProject};
