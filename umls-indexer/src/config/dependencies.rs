//! Dependency initialization and wiring for the UMLS indexer.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::config::IndexerSettings;
use crate::IndexingError;
use umls_indexer_pipeline::{
    loader::{BulkLoader, LoaderConfig},
    orchestrator::{Orchestrator, OrchestratorConfig},
    stream::StreamOptions,
};
use umls_indexer_repository::opensearch::{default_mapping, legacy_doc_type};
use umls_indexer_repository::{OpenSearchClient, SearchIndexClient, SearchIndexProvider};
use umls_indexer_shared::IndexTarget;

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The configured orchestrator ready to run.
    pub orchestrator: Orchestrator,
}

impl Dependencies {
    /// Initialize all dependencies from resolved settings.
    ///
    /// Connects to OpenSearch and verifies the cluster is healthy before
    /// anything is read from disk.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(IndexingError)` - If initialization fails
    pub async fn new(settings: &IndexerSettings) -> Result<Self, IndexingError> {
        info!(
            opensearch_url = %settings.opensearch_url,
            index = %settings.index,
            source = %settings.mrconso_path.display(),
            "Initializing dependencies"
        );

        let search_client = match &settings.credentials {
            Some(auth) => {
                OpenSearchClient::with_basic_auth(&settings.opensearch_url, &auth.username, &auth.password)
                    .await
            }
            None => OpenSearchClient::new(&settings.opensearch_url).await,
        }
        .map_err(|e| IndexingError::config(format!("Failed to create OpenSearch client: {}", e)))?;

        let healthy = search_client
            .health_check()
            .await
            .map_err(|e| IndexingError::config(format!("OpenSearch health check failed: {}", e)))?;

        if !healthy {
            return Err(IndexingError::config("OpenSearch cluster is unhealthy"));
        }

        info!("OpenSearch connection verified");

        Self::with_provider(settings, Box::new(search_client))
    }

    /// Wire the pipeline around an already connected provider.
    pub fn with_provider(
        settings: &IndexerSettings,
        provider: Box<dyn SearchIndexProvider>,
    ) -> Result<Self, IndexingError> {
        let mapping = load_mapping(settings.mapping_path.as_deref())?;
        let config = orchestrator_config(settings, mapping);

        let client = Arc::new(SearchIndexClient::new(provider));
        let loader = BulkLoader::with_config(
            client.clone(),
            LoaderConfig {
                batch_size: settings.batch_size,
            },
        );

        let orchestrator = Orchestrator::new(client, loader, config);

        Ok(Self { orchestrator })
    }
}

/// Read the index body from `path`, or fall back to the built-in mapping.
pub fn load_mapping(path: Option<&Path>) -> Result<Value, IndexingError> {
    let Some(path) = path else {
        info!("Using built-in index mapping");
        return Ok(default_mapping());
    };

    let contents = fs::read_to_string(path).map_err(|e| {
        IndexingError::config(format!("Cannot read mapping file {}: {}", path.display(), e))
    })?;
    let mapping: Value = serde_json::from_str(&contents)?;

    if !mapping.is_object() {
        return Err(IndexingError::config(format!(
            "Mapping file {} must contain a JSON object",
            path.display()
        )));
    }

    info!(path = %path.display(), "Loaded index mapping");
    Ok(mapping)
}

/// Destination of the run. A configured document type wins over the one a
/// legacy mapping declares.
pub fn resolve_target(settings: &IndexerSettings, mapping: &Value) -> IndexTarget {
    let target = IndexTarget::new(settings.index.clone());

    match settings.doc_type.clone().or_else(|| legacy_doc_type(mapping)) {
        Some(doc_type) => {
            info!(doc_type = %doc_type, "Using document type");
            target.with_doc_type(doc_type)
        }
        None => target,
    }
}

/// Build the orchestrator configuration for `settings`.
pub fn orchestrator_config(settings: &IndexerSettings, mapping: Value) -> OrchestratorConfig {
    let target = resolve_target(settings, &mapping);

    let mut config = OrchestratorConfig::new(settings.mrconso_path.clone(), target, mapping);
    config.on_existing = settings.on_existing;
    config.stream = StreamOptions {
        demo: settings.demo,
        notify_every: settings.notify_every,
    };
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;
    use umls_indexer_repository::ExistingIndexPolicy;

    fn settings() -> IndexerSettings {
        IndexerSettings {
            mrconso_path: PathBuf::from("/data/MRCONSO.RRF"),
            mapping_path: None,
            opensearch_url: "http://localhost:9200".to_string(),
            credentials: None,
            index: "umls".to_string(),
            doc_type: None,
            batch_size: 500,
            demo: Some(10),
            notify_every: 1000,
            on_existing: ExistingIndexPolicy::Recreate,
            log_json: false,
        }
    }

    #[test]
    fn test_builtin_mapping_without_path() {
        let mapping = load_mapping(None).unwrap();

        assert_eq!(mapping, default_mapping());
    }

    #[test]
    fn test_mapping_loaded_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"mappings": {{"concept": {{"properties": {{}}}}}}}}"#).unwrap();
        file.flush().unwrap();

        let mapping = load_mapping(Some(file.path())).unwrap();

        assert_eq!(mapping, json!({"mappings": {"concept": {"properties": {}}}}));
    }

    #[test]
    fn test_mapping_file_must_be_object() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();
        file.flush().unwrap();

        assert!(matches!(
            load_mapping(Some(file.path())),
            Err(IndexingError::ConfigError(_))
        ));
    }

    #[test]
    fn test_doc_type_from_legacy_mapping() {
        let mapping = json!({"mappings": {"concept": {"properties": {}}}});

        let target = resolve_target(&settings(), &mapping);

        assert_eq!(target.doc_type.as_deref(), Some("concept"));
    }

    #[test]
    fn test_configured_doc_type_wins() {
        let mapping = json!({"mappings": {"concept": {"properties": {}}}});
        let settings = IndexerSettings {
            doc_type: Some("atom".to_string()),
            ..settings()
        };

        let target = resolve_target(&settings, &mapping);

        assert_eq!(target.doc_type.as_deref(), Some("atom"));
    }

    #[test]
    fn test_typeless_mapping_has_no_doc_type() {
        let target = resolve_target(&settings(), &default_mapping());

        assert_eq!(target, IndexTarget::new("umls"));
    }

    #[test]
    fn test_orchestrator_config_carries_settings() {
        let config = orchestrator_config(&settings(), default_mapping());

        assert_eq!(config.source_path, PathBuf::from("/data/MRCONSO.RRF"));
        assert_eq!(config.on_existing, ExistingIndexPolicy::Recreate);
        assert_eq!(config.stream.demo, Some(10));
        assert_eq!(config.stream.notify_every, 1000);
        assert_eq!(config.target.index, "umls");
    }
}
