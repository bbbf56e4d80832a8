//! Caller-facing document operations.
//!
//! [`DocumentService`] is the surface an outer shell (CLI, HTTP handler)
//! calls into: ingestion, queries, lookups, deletion, listing, counting,
//! batch ingestion, and health reporting. Components are passed in
//! explicitly; the service owns no global state.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::RagConfig;
use crate::document::{Document, DocumentInput, HealthStatus, IngestOutcome, QueryResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;
use crate::workflow::QueryWorkflow;

/// Ingestion, retrieval, and lookup over one vector collection.
///
/// # Example
///
/// ```rust,ignore
/// use bithealth_rag::{DocumentInput, DocumentService, RagConfig};
///
/// let service = DocumentService::new(RagConfig::default(), embedder, store)?;
/// let id = service.ingest(DocumentInput::new("The sky is blue.")).await?;
/// let result = service.query("what colour is the sky?", None).await?;
/// ```
pub struct DocumentService {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
    workflow: QueryWorkflow,
}

impl DocumentService {
    /// Build the service and its query workflow from explicit components.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the config, provider and store
    /// disagree on vector dimensionality.
    pub fn new(
        config: RagConfig,
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Result<Self> {
        let workflow = QueryWorkflow::builder()
            .config(config)
            .embedding_provider(embedding_provider.clone())
            .vector_store(vector_store.clone())
            .build()?;
        Ok(Self { embedding_provider, vector_store, workflow })
    }

    /// The query workflow used by [`query`](Self::query).
    pub fn workflow(&self) -> &QueryWorkflow {
        &self.workflow
    }

    /// Embed and store a new document, returning its generated ID.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::EmbeddingError`] for blank content and
    /// [`RagError::VectorStoreError`] if the store rejects the write.
    pub async fn ingest(&self, input: DocumentInput) -> Result<String> {
        let embedding = self.embedding_provider.embed(&input.content).await?;

        let now = Utc::now();
        let document = Document {
            id: Uuid::new_v4().to_string(),
            content: input.content,
            metadata: input.metadata,
            embedding: Some(embedding),
            created_at: now,
            updated_at: now,
        };

        self.vector_store.upsert(&document).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "upsert failed during ingestion");
            e
        })?;

        info!(document.id = %document.id, "ingested document");
        Ok(document.id)
    }

    /// Ingest each input independently.
    ///
    /// Never fails as a whole: each item yields either its new ID or the
    /// error that prevented storing it, in input order.
    pub async fn batch_ingest(&self, inputs: Vec<DocumentInput>) -> Vec<IngestOutcome> {
        let mut outcomes = Vec::with_capacity(inputs.len());
        for (index, input) in inputs.into_iter().enumerate() {
            match self.ingest(input).await {
                Ok(id) => outcomes.push(IngestOutcome::Success { id }),
                Err(e) => {
                    warn!(index, error = %e, "batch item failed");
                    outcomes.push(IngestOutcome::Error { error: e.to_string() });
                }
            }
        }
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        info!(total = outcomes.len(), succeeded, "batch ingestion finished");
        outcomes
    }

    /// Answer `text` from the most similar stored documents.
    ///
    /// `top_k` overrides the configured number of retrieved documents.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `top_k` is `Some(0)`, and
    /// [`RagError::WorkflowError`] if the query workflow fails.
    pub async fn query(&self, text: &str, top_k: Option<usize>) -> Result<QueryResult> {
        let top_k = match top_k {
            Some(0) => {
                return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
            }
            Some(k) => k,
            None => self.workflow.top_k(),
        };
        self.workflow.execute_with_top_k(text, top_k).await
    }

    /// Fetch a stored document.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`] if no document has this ID.
    pub async fn get(&self, id: &str) -> Result<Document> {
        self.vector_store.get(id).await?.ok_or_else(|| RagError::NotFound(id.to_string()))
    }

    /// Delete a stored document.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::NotFound`] if no document has this ID.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.get(id).await?;
        if !self.vector_store.delete(id).await? {
            return Err(RagError::NotFound(id.to_string()));
        }
        info!(document.id = id, "deleted document");
        Ok(())
    }

    /// List up to `limit` stored documents.
    pub async fn list(&self, limit: usize) -> Result<Vec<Document>> {
        self.vector_store.list(limit).await
    }

    /// Count stored documents.
    pub async fn count(&self) -> Result<usize> {
        self.vector_store.count().await
    }

    /// Report readiness of the vector store and the query workflow.
    pub async fn health(&self) -> HealthStatus {
        let index_healthy = self.vector_store.health().await;
        let workflow_healthy = self.workflow.is_healthy();
        let documents_count = match self.vector_store.count().await {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "document count failed during health check");
                0
            }
        };

        HealthStatus {
            status: if index_healthy && workflow_healthy { "OK" } else { "unhealthy" }.to_string(),
            index: if index_healthy { "connected" } else { "disconnected" }.to_string(),
            workflow: if workflow_healthy { "ready" } else { "not ready" }.to_string(),
            documents_count,
        }
    }
}
