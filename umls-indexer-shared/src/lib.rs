//! # UMLS Indexer Shared
//!
//! Types shared between the pipeline and the search repository: the bulk
//! envelope that wraps every concept document and the index it is bound for.

use serde::{Deserialize, Serialize};

/// Destination of produced documents: index name and optional document type.
///
/// The document type only matters for legacy clusters that still use mapping
/// types; OpenSearch 2 ignores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexTarget {
    /// Name of the destination index.
    pub index: String,
    /// Optional document type name.
    pub doc_type: Option<String>,
}

impl IndexTarget {
    /// Create a target for an index without a document type.
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            doc_type: None,
        }
    }

    /// Set the document type.
    pub fn with_doc_type(mut self, doc_type: impl Into<String>) -> Self {
        self.doc_type = Some(doc_type.into());
        self
    }
}

/// Searchable body of a concept document.
///
/// `text` and `ngrams` carry the same string; the index mapping analyzes them
/// differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptPayload {
    /// Raw concept string (`STR`).
    pub text: String,
    /// Concept string indexed with an n-gram analyzer (`STR`).
    pub ngrams: String,
    /// Atom unique identifier.
    #[serde(rename = "AUI")]
    pub aui: String,
    /// Concept unique identifier.
    #[serde(rename = "CUI")]
    pub cui: String,
    /// String unique identifier.
    #[serde(rename = "SUI")]
    pub sui: String,
}

/// A concept document wrapped in its bulk envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptDocument {
    /// Destination index.
    pub index: String,
    /// Document type, if the target declares one.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub doc_type: Option<String>,
    /// Document id; always the atom's AUI.
    pub id: String,
    /// Document body.
    pub source: ConceptPayload,
}

impl ConceptDocument {
    /// Build a document for `target` from the four identifying fields of an atom.
    pub fn new(
        target: &IndexTarget,
        aui: impl Into<String>,
        cui: impl Into<String>,
        sui: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let aui = aui.into();
        let text = text.into();

        Self {
            index: target.index.clone(),
            doc_type: target.doc_type.clone(),
            id: aui.clone(),
            source: ConceptPayload {
                ngrams: text.clone(),
                text,
                aui,
                cui: cui.into(),
                sui: sui.into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_id_is_aui() {
        let target = IndexTarget::new("umls");
        let doc = ConceptDocument::new(&target, "A0054859", "C0004057", "S0007429", "Aspirin");

        assert_eq!(doc.id, "A0054859");
        assert_eq!(doc.source.aui, doc.id);
        assert_eq!(doc.source.text, "Aspirin");
        assert_eq!(doc.source.ngrams, "Aspirin");
        assert_eq!(doc.index, "umls");
        assert!(doc.doc_type.is_none());
    }

    #[test]
    fn test_envelope_serialization() {
        let target = IndexTarget::new("umls").with_doc_type("concept");
        let doc = ConceptDocument::new(&target, "A1", "C1", "S1", "Heart");

        let value = serde_json::to_value(&doc).unwrap();

        assert_eq!(value["index"], "umls");
        assert_eq!(value["type"], "concept");
        assert_eq!(value["id"], "A1");
        assert_eq!(value["source"]["AUI"], "A1");
        assert_eq!(value["source"]["CUI"], "C1");
        assert_eq!(value["source"]["SUI"], "S1");
        assert_eq!(value["source"]["text"], "Heart");
        assert_eq!(value["source"]["ngrams"], "Heart");
    }

    #[test]
    fn test_envelope_omits_missing_type() {
        let doc = ConceptDocument::new(&IndexTarget::new("umls"), "A1", "C1", "S1", "Heart");
        let value = serde_json::to_value(&doc).unwrap();

        assert!(value.get("type").is_none());
    }
}
