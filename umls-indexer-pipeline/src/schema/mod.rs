//! Schema module for the concept pipeline.
//!
//! Describes the column layout of an RRF file as data and decodes raw lines
//! into named, typed records.

mod field_spec;
mod record;

pub use field_spec::{FieldKind, FieldSpec, Schema};
pub use record::{FieldValue, ParsedRecord};
