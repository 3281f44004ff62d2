//! Loader module for the concept pipeline.
//!
//! Loads concept documents into the search index in fixed-size bulk batches.

use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::errors::PipelineError;
use umls_indexer_repository::SearchIndexClient;
use umls_indexer_shared::ConceptDocument;

/// Configuration for the bulk loader.
#[derive(Debug, Clone, Copy)]
pub struct LoaderConfig {
    /// Number of documents per bulk request.
    pub batch_size: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { batch_size: 500 }
    }
}

/// Totals of a completed load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Documents handed to the search index.
    pub submitted: usize,
    /// Documents the engine accepted.
    pub succeeded: usize,
    /// Documents the engine rejected.
    pub failed: usize,
    /// Bulk requests sent.
    pub batches: usize,
}

/// Loader that indexes documents into the search engine.
///
/// The loader is responsible for:
/// - Pulling documents from the stream one batch at a time
/// - Submitting each batch through the bulk API
/// - Logging and counting per-document failures
pub struct BulkLoader {
    client: Arc<SearchIndexClient>,
    config: LoaderConfig,
}

impl BulkLoader {
    /// Create a new bulk loader with the given client.
    pub fn new(client: Arc<SearchIndexClient>) -> Self {
        Self {
            client,
            config: LoaderConfig::default(),
        }
    }

    /// Create a new bulk loader with custom configuration.
    pub fn with_config(client: Arc<SearchIndexClient>, config: LoaderConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Drain `documents` into the search index.
    ///
    /// Documents are submitted in batches of `batch_size`; the last batch may
    /// be shorter. A stream error is fatal: documents pulled before it are
    /// flushed, then the error is returned. Rejected documents are logged and
    /// counted, never retried.
    #[instrument(skip(self, documents), fields(batch_size = self.config.batch_size))]
    pub async fn load_all<I>(&self, documents: I) -> Result<LoadSummary, PipelineError>
    where
        I: IntoIterator<Item = Result<ConceptDocument, PipelineError>>,
    {
        let batch_size = self.config.batch_size;
        if batch_size == 0 {
            return Err(PipelineError::loader("batch size must be greater than zero"));
        }
        self.client.validate_batch_size(batch_size)?;

        let mut documents = documents.into_iter();
        let mut batch = Vec::with_capacity(batch_size);
        let mut summary = LoadSummary::default();

        loop {
            let mut stream_error = None;
            let mut exhausted = false;

            while batch.len() < batch_size {
                match documents.next() {
                    Some(Ok(doc)) => batch.push(doc),
                    Some(Err(e)) => {
                        stream_error = Some(e);
                        break;
                    }
                    None => {
                        exhausted = true;
                        break;
                    }
                }
            }

            if !batch.is_empty() {
                self.flush(&mut batch, &mut summary).await?;
            }

            if let Some(e) = stream_error {
                error!(error = %e, submitted = summary.submitted, "Document stream failed");
                return Err(e);
            }

            if exhausted {
                break;
            }
        }

        info!(
            submitted = summary.submitted,
            succeeded = summary.succeeded,
            failed = summary.failed,
            batches = summary.batches,
            "Bulk load completed"
        );

        Ok(summary)
    }

    /// Submit the pending batch and fold its outcome into `summary`.
    async fn flush(
        &self,
        batch: &mut Vec<ConceptDocument>,
        summary: &mut LoadSummary,
    ) -> Result<(), PipelineError> {
        let count = batch.len();
        debug!(count = count, "Flushing documents to search index");

        let result = self.client.batch_index(batch).await;
        batch.clear();
        let result = result?;

        for failure in result.failures() {
            error!(
                id = %failure.id,
                error = failure.error.as_deref().unwrap_or("unknown error"),
                "Failed to index document"
            );
        }

        summary.submitted += count;
        summary.succeeded += result.succeeded;
        summary.failed += result.failed;
        summary.batches += 1;

        debug!(
            succeeded = result.succeeded,
            failed = result.failed,
            "Batch indexed"
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::Mutex;
    use umls_indexer_repository::{
        BatchOperationResult, BatchOperationSummary, SearchIndexConfig, SearchIndexError,
        SearchIndexProvider,
    };
    use umls_indexer_shared::IndexTarget;

    /// Mock provider that records batch sizes and rejects listed ids.
    #[derive(Default)]
    struct MockProvider {
        batches: Arc<Mutex<Vec<Vec<String>>>>,
        reject: Vec<String>,
    }

    #[async_trait]
    impl SearchIndexProvider for MockProvider {
        async fn index_exists(&self, _index: &str) -> Result<bool, SearchIndexError> {
            Ok(true)
        }

        async fn create_index(&self, _index: &str, _mapping: &Value) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn delete_index(&self, _index: &str) -> Result<(), SearchIndexError> {
            Ok(())
        }

        async fn bulk_index_documents(
            &self,
            documents: &[ConceptDocument],
        ) -> Result<BatchOperationSummary, SearchIndexError> {
            self.batches
                .lock()
                .unwrap()
                .push(documents.iter().map(|d| d.id.clone()).collect());

            let results = documents
                .iter()
                .map(|d| {
                    let rejected = self.reject.contains(&d.id);
                    BatchOperationResult {
                        id: d.id.clone(),
                        success: !rejected,
                        error: rejected.then(|| "mapper_parsing_exception".to_string()),
                    }
                })
                .collect();

            Ok(BatchOperationSummary::from_results(results))
        }

        async fn health_check(&self) -> Result<bool, SearchIndexError> {
            Ok(true)
        }
    }

    fn doc(n: usize) -> Result<ConceptDocument, PipelineError> {
        Ok(ConceptDocument::new(
            &IndexTarget::new("umls"),
            format!("A{n}"),
            format!("C{n}"),
            format!("S{n}"),
            format!("Term {n}"),
        ))
    }

    fn loader(provider: MockProvider, batch_size: usize) -> BulkLoader {
        let client = SearchIndexClient::with_config(
            Box::new(provider),
            SearchIndexConfig::with_max_batch_size(100),
        );
        BulkLoader::with_config(Arc::new(client), LoaderConfig { batch_size })
    }

    #[tokio::test]
    async fn test_batches_by_size_and_flushes_tail() {
        let provider = MockProvider::default();
        let batches = provider.batches.clone();
        let loader = loader(provider, 2);

        let summary = loader.load_all((1..=5).map(doc)).await.unwrap();

        assert_eq!(
            summary,
            LoadSummary {
                submitted: 5,
                succeeded: 5,
                failed: 0,
                batches: 3,
            }
        );
        let sizes: Vec<usize> = batches.lock().unwrap().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
    }

    #[tokio::test]
    async fn test_empty_stream_sends_nothing() {
        let provider = MockProvider::default();
        let batches = provider.batches.clone();
        let loader = loader(provider, 10);

        let summary = loader.load_all(Vec::new()).await.unwrap();

        assert_eq!(summary, LoadSummary::default());
        assert!(batches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_item_failures_are_counted() {
        let provider = MockProvider {
            reject: vec!["A2".to_string()],
            ..Default::default()
        };
        let loader = loader(provider, 10);

        let summary = loader.load_all((1..=3).map(doc)).await.unwrap();

        assert_eq!(summary.submitted, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.batches, 1);
    }

    #[tokio::test]
    async fn test_stream_error_flushes_then_fails() {
        let provider = MockProvider::default();
        let batches = provider.batches.clone();
        let loader = loader(provider, 10);

        let documents = vec![
            doc(1),
            doc(2),
            Err(PipelineError::io(
                "MRCONSO.RRF",
                std::io::Error::new(std::io::ErrorKind::Other, "read failed"),
            )),
            doc(3),
        ];

        let result = loader.load_all(documents).await;

        assert!(matches!(result, Err(PipelineError::SourceError { .. })));
        assert_eq!(*batches.lock().unwrap(), vec![vec!["A1".to_string(), "A2".to_string()]]);
    }

    #[tokio::test]
    async fn test_rejects_zero_batch_size() {
        let loader = loader(MockProvider::default(), 0);

        let result = loader.load_all((1..=2).map(doc)).await;

        assert!(matches!(result, Err(PipelineError::LoaderError(_))));
    }

    #[tokio::test]
    async fn test_rejects_batch_size_above_client_limit() {
        let loader = loader(MockProvider::default(), 1_000);

        let result = loader.load_all((1..=2).map(doc)).await;

        assert!(matches!(
            result,
            Err(PipelineError::SearchError(SearchIndexError::BatchSizeExceeded { .. }))
        ));
    }
}
