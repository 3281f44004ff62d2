//! Orchestrator module for the concept pipeline.
//!
//! Coordinates index provisioning, the concept stream and the loader.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{info, instrument, warn};

use crate::errors::PipelineError;
use crate::loader::{BulkLoader, LoadSummary};
use crate::schema::Schema;
use crate::stream::{ConceptStream, StreamOptions, StreamStats};
use umls_indexer_repository::{ExistingIndexPolicy, IndexProvisioning, SearchIndexClient};
use umls_indexer_shared::IndexTarget;

/// Configuration for one indexing run.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Path of the MRCONSO extract.
    pub source_path: PathBuf,
    /// Destination index and document type.
    pub target: IndexTarget,
    /// Settings and mappings used when the index has to be created.
    pub mapping: Value,
    /// What to do if the index already exists.
    pub on_existing: ExistingIndexPolicy,
    /// Demo bound and progress interval.
    pub stream: StreamOptions,
    /// Column layout of the extract.
    pub schema: Schema,
}

impl OrchestratorConfig {
    pub fn new(source_path: impl Into<PathBuf>, target: IndexTarget, mapping: Value) -> Self {
        Self {
            source_path: source_path.into(),
            target,
            mapping,
            on_existing: ExistingIndexPolicy::default(),
            stream: StreamOptions::default(),
            schema: Schema::mrconso(),
        }
    }
}

/// Outcome of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub provisioning: IndexProvisioning,
    pub load: LoadSummary,
    pub stream: StreamStats,
}

/// Orchestrator that coordinates the pipeline components.
///
/// The orchestrator:
/// - Opens the concept stream over the extract
/// - Makes sure the destination index exists
/// - Drives the loader until the stream ends, fails or is cancelled
pub struct Orchestrator {
    client: Arc<SearchIndexClient>,
    loader: BulkLoader,
    config: OrchestratorConfig,
    shutdown_tx: watch::Sender<bool>,
}

impl Orchestrator {
    /// Create a new orchestrator. `loader` should share `client`.
    pub fn new(client: Arc<SearchIndexClient>, loader: BulkLoader, config: OrchestratorConfig) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            client,
            loader,
            config,
            shutdown_tx,
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run the pipeline to completion.
    ///
    /// Returns once every document has been submitted, the demo bound has
    /// been reached, the stream has failed, or a shutdown was requested
    /// (by `shutdown` or Ctrl-C).
    #[instrument(skip(self), fields(index = %self.config.target.index))]
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        info!(
            source = %self.config.source_path.display(),
            policy = %self.config.on_existing,
            "Starting concept indexing"
        );

        let mut stream = ConceptStream::with_schema(
            self.config.source_path.clone(),
            self.config.schema.clone(),
            self.config.target.clone(),
            self.config.stream,
        );

        // The index is only touched once the extract is known to be readable.
        stream.open_source()?;

        let provisioning = match self
            .client
            .ensure_index(&self.config.target.index, &self.config.mapping, self.config.on_existing)
            .await
        {
            Ok(provisioning) => provisioning,
            Err(e) => {
                stream.close();
                return Err(e.into());
            }
        };

        let mut shutdown_rx = self.shutdown_tx.subscribe();

        let outcome = tokio::select! {
            biased;
            _ = shutdown_rx.wait_for(|stop| *stop) => Err(PipelineError::Cancelled),
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                Err(PipelineError::Cancelled)
            }
            result = self.loader.load_all(stream.by_ref()) => result,
        };

        stream.close();

        let load = match outcome {
            Ok(load) => load,
            Err(e) => {
                warn!(error = %e, stats = ?stream.stats(), "Concept indexing stopped early");
                return Err(e);
            }
        };

        let report = RunReport {
            provisioning,
            load,
            stream: stream.stats(),
        };

        info!(
            documents = report.load.submitted,
            failed = report.load.failed,
            skipped = report.stream.skipped,
            "Concept indexing complete"
        );

        Ok(report)
    }

    /// Request a graceful shutdown of a running or upcoming `run`.
    pub fn shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }
}
