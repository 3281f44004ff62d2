//! OpenSearch client implementation.
//!
//! This module provides the concrete implementation of `SearchIndexProvider`
//! using the OpenSearch Rust client.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cluster::ClusterHealthParts,
    http::request::JsonBody,
    http::transport::{SingleNodeConnectionPool, TransportBuilder},
    indices::{IndicesCreateParts, IndicesDeleteParts, IndicesExistsParts},
    BulkParts, OpenSearch,
};
use serde_json::{json, Value};
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::errors::SearchIndexError;
use crate::interfaces::SearchIndexProvider;
use crate::types::{BatchOperationResult, BatchOperationSummary};
use umls_indexer_shared::ConceptDocument;

/// OpenSearch client implementation.
///
/// # Example
///
/// ```ignore
/// let client = OpenSearchClient::new("http://localhost:9200").await?;
/// let summary = client.bulk_index_documents(&documents).await?;
/// println!("{} of {} indexed", summary.succeeded, summary.total);
/// ```
pub struct OpenSearchClient {
    client: OpenSearch,
}

impl OpenSearchClient {
    /// Create a new OpenSearch client connected to the specified URL.
    ///
    /// # Arguments
    ///
    /// * `url` - The OpenSearch server URL (e.g., "http://localhost:9200")
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchClient)` - A new client instance
    /// * `Err(SearchIndexError)` - If connection setup fails
    pub async fn new(url: &str) -> Result<Self, SearchIndexError> {
        Self::connect(url, None).await
    }

    /// Create a client that authenticates every request with HTTP basic auth.
    pub async fn with_basic_auth(
        url: &str,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, SearchIndexError> {
        Self::connect(url, Some(Credentials::Basic(username.into(), password.into()))).await
    }

    async fn connect(url: &str, credentials: Option<Credentials>) -> Result<Self, SearchIndexError> {
        let parsed_url =
            Url::parse(url).map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        let authenticated = credentials.is_some();
        if let Some(credentials) = credentials {
            builder = builder.auth(credentials);
        }
        let transport = builder
            .build()
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let client = OpenSearch::new(transport);

        info!(url = %url, authenticated, "Created OpenSearch client");

        Ok(Self { client })
    }

    /// Build the NDJSON bulk body: one action line and one source line per document.
    fn bulk_body(documents: &[ConceptDocument]) -> Result<Vec<Value>, SearchIndexError> {
        let mut body = Vec::with_capacity(documents.len() * 2);

        for doc in documents {
            let mut action = serde_json::Map::new();
            action.insert("_index".to_string(), json!(doc.index));
            action.insert("_id".to_string(), json!(doc.id));
            if let Some(ref doc_type) = doc.doc_type {
                action.insert("_type".to_string(), json!(doc_type));
            }

            body.push(json!({ "index": action }));
            body.push(
                serde_json::to_value(&doc.source)
                    .map_err(|e| SearchIndexError::serialization(e.to_string()))?,
            );
        }

        Ok(body)
    }

    /// Turn a bulk response into per-document results.
    ///
    /// Items come back in request order. A document with no matching item is
    /// reported as failed.
    fn summarize_bulk_response(documents: &[ConceptDocument], response: &Value) -> BatchOperationSummary {
        let items = response
            .get("items")
            .and_then(|i| i.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let results = documents
            .iter()
            .enumerate()
            .map(|(position, doc)| {
                let outcome = items.get(position).and_then(|item| item.get("index"));
                let error = match outcome {
                    None => Some("missing item in bulk response".to_string()),
                    Some(outcome) => outcome.get("error").map(|e| {
                        e.get("reason")
                            .and_then(|r| r.as_str())
                            .map(str::to_string)
                            .unwrap_or_else(|| e.to_string())
                    }),
                };

                BatchOperationResult {
                    id: doc.id.clone(),
                    success: error.is_none(),
                    error,
                }
            })
            .collect();

        BatchOperationSummary::from_results(results)
    }
}

#[async_trait]
impl SearchIndexProvider for OpenSearchClient {
    async fn index_exists(&self, index: &str) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => Err(SearchIndexError::connection(format!(
                "Unexpected status {} checking index {}",
                status, index
            ))),
        }
    }

    #[instrument(skip(self, mapping))]
    async fn create_index(&self, index: &str, mapping: &Value) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .create(IndicesCreateParts::Index(index))
            .body(mapping.clone())
            .send()
            .await
            .map_err(|e| SearchIndexError::provisioning(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Create index request failed");
            return Err(SearchIndexError::provisioning(format!(
                "Create index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, "Index created");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_index(&self, index: &str) -> Result<(), SearchIndexError> {
        let response = self
            .client
            .indices()
            .delete(IndicesDeleteParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| SearchIndexError::provisioning(e.to_string()))?;

        let status = response.status_code();

        // 404 is acceptable - index may not exist
        if !status.is_success() && status.as_u16() != 404 {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Delete index request failed");
            return Err(SearchIndexError::provisioning(format!(
                "Delete index failed with status {}: {}",
                status, error_body
            )));
        }

        debug!(index = %index, "Index deleted");
        Ok(())
    }

    #[instrument(skip(self, documents), fields(count = documents.len()))]
    async fn bulk_index_documents(
        &self,
        documents: &[ConceptDocument],
    ) -> Result<BatchOperationSummary, SearchIndexError> {
        if documents.is_empty() {
            return Ok(BatchOperationSummary::empty());
        }

        let body: Vec<JsonBody<Value>> = Self::bulk_body(documents)?
            .into_iter()
            .map(JsonBody::from)
            .collect();

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(body)
            .send()
            .await
            .map_err(|e| SearchIndexError::bulk_operation(e.to_string()))?;

        let status = response.status_code();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "Bulk request failed");
            return Err(SearchIndexError::bulk_operation(format!(
                "Bulk request failed with status {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;

        let summary = Self::summarize_bulk_response(documents, &response_body);
        debug!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Bulk request completed"
        );

        Ok(summary)
    }

    async fn health_check(&self) -> Result<bool, SearchIndexError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| SearchIndexError::connection(e.to_string()))?;

        let health: Value = response
            .json()
            .await
            .map_err(|e| SearchIndexError::serialization(e.to_string()))?;
        let status = health
            .get("status")
            .and_then(|s| s.as_str())
            .unwrap_or("unknown");

        debug!(status = %status, "OpenSearch cluster status");
        Ok(status == "green" || status == "yellow")
    }
}
