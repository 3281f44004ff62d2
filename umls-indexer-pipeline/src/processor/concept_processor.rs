//! Concept processor implementation.
//!
//! Turns raw MRCONSO lines into `ConceptDocument` structures for indexing.

use tracing::debug;

use crate::errors::{MalformedRecordError, RecordError};
use crate::processor::skip_malformed::TryProject;
use crate::schema::{ParsedRecord, Schema};
use crate::source::RawLine;
use umls_indexer_shared::{ConceptDocument, IndexTarget};

/// Fields a record must carry to become a document.
pub const REQUIRED_FIELDS: [&str; 4] = ["AUI", "CUI", "SUI", "STR"];

/// Processor that projects MRCONSO records into concept documents.
///
/// The processor is responsible for:
/// - Decoding raw lines against the schema
/// - Rejecting records without an AUI, CUI, SUI or STR
/// - Wrapping the payload in the bulk envelope for the target index
pub struct ConceptProcessor {
    schema: Schema,
    target: IndexTarget,
    short_lines: u64,
}

impl ConceptProcessor {
    /// Create a processor for the MRCONSO layout.
    pub fn new(target: IndexTarget) -> Self {
        Self::with_schema(Schema::mrconso(), target)
    }

    /// Create a processor for a custom column layout.
    pub fn with_schema(schema: Schema, target: IndexTarget) -> Self {
        Self {
            schema,
            target,
            short_lines: 0,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn target(&self) -> &IndexTarget {
        &self.target
    }

    /// Lines seen so far with fewer columns than the schema.
    pub fn short_lines(&self) -> u64 {
        self.short_lines
    }

    /// Project a decoded record into a document.
    ///
    /// # Returns
    ///
    /// * `Ok(ConceptDocument)` - With `id` and `AUI` set from the record's AUI
    /// * `Err(MalformedRecordError)` - Listing every required field that is absent or empty
    pub fn project_record(&self, record: &ParsedRecord) -> Result<ConceptDocument, MalformedRecordError> {
        let missing: Vec<String> = REQUIRED_FIELDS
            .iter()
            .filter(|name| record.get(name).is_none())
            .map(|name| name.to_string())
            .collect();

        if !missing.is_empty() {
            return Err(MalformedRecordError { missing });
        }

        let field = |name: &str| record.get(name).map(ToString::to_string).unwrap_or_default();

        Ok(ConceptDocument::new(
            &self.target,
            field("AUI"),
            field("CUI"),
            field("SUI"),
            field("STR"),
        ))
    }
}

impl TryProject for ConceptProcessor {
    type Output = ConceptDocument;

    fn try_project(&mut self, line: &RawLine) -> Result<ConceptDocument, RecordError> {
        let record = self.schema.parse(line)?;

        if record.is_short() {
            self.short_lines += 1;
            debug!(
                line = line.line_number(),
                columns = record.len(),
                expected = self.schema.len(),
                "Line has fewer columns than the schema"
            );
        }

        Ok(self.project_record(&record)?)
    }
}
