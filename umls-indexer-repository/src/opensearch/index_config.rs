//! OpenSearch index configuration and mappings.
//!
//! This module defines the default settings and mappings for the concept index
//! and helpers for inspecting user-supplied mappings.

use serde_json::{json, Value};

/// The default name of the concept index.
pub const DEFAULT_INDEX_NAME: &str = "umls";

/// Keys that may appear directly under `mappings` in a typeless mapping.
const RESERVED_MAPPING_KEYS: &[&str] = &[
    "properties",
    "dynamic",
    "dynamic_templates",
    "date_detection",
    "numeric_detection",
    "runtime",
];

/// Get the index settings and mappings for the concept index.
///
/// The configuration includes:
/// - **text**: standard-analyzed copy of the concept string
/// - **ngrams**: the same string indexed with an edge n-gram analyzer for
///   prefix matching, searched with the standard analyzer
/// - **Keyword fields**: `AUI`, `CUI` and `SUI` for exact lookups
pub fn default_mapping() -> Value {
    json!({
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 1,
            "analysis": {
                "tokenizer": {
                    "edge_ngram_tokenizer": {
                        "type": "edge_ngram",
                        "min_gram": 2,
                        "max_gram": 15,
                        "token_chars": ["letter", "digit"]
                    }
                },
                "analyzer": {
                    "ngram_analyzer": {
                        "type": "custom",
                        "tokenizer": "edge_ngram_tokenizer",
                        "filter": ["lowercase", "asciifolding"]
                    }
                }
            }
        },
        "mappings": {
            "properties": {
                "text": {
                    "type": "text",
                    "analyzer": "standard"
                },
                "ngrams": {
                    "type": "text",
                    "analyzer": "ngram_analyzer",
                    "search_analyzer": "standard"
                },
                "AUI": {
                    "type": "keyword"
                },
                "CUI": {
                    "type": "keyword"
                },
                "SUI": {
                    "type": "keyword"
                }
            }
        }
    })
}

/// Detect the document type of a legacy typed mapping.
///
/// Pre-7.x mappings nest the field definitions under a single type name
/// (`{"mappings": {"concept": {"properties": ...}}}`). Returns that name, or
/// `None` for typeless mappings.
pub fn legacy_doc_type(mapping: &Value) -> Option<String> {
    let mappings = mapping.get("mappings")?.as_object()?;
    if mappings.len() != 1 {
        return None;
    }

    let (name, body) = mappings.iter().next()?;
    if name.starts_with('_') || RESERVED_MAPPING_KEYS.contains(&name.as_str()) || !body.is_object() {
        return None;
    }

    Some(name.clone())
}
