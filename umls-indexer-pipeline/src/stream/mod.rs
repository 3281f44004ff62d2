//! Stream module for the concept pipeline.
//!
//! Bounds the document sequence for demo runs and reports progress.

mod concept_stream;
mod progress;

pub use concept_stream::{ConceptStream, StreamOptions, StreamState, StreamStats};
pub use progress::{LogProgress, ProgressObserver};
