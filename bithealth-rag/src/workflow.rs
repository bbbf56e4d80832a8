//! Query workflow orchestrator.
//!
//! The [`QueryWorkflow`] runs the retrieve step and then the answer step over
//! a fresh [`PipelineState`] per query, and projects the finished state into
//! a [`QueryResult`].
//!
//! # Example
//!
//! ```rust,ignore
//! use bithealth_rag::{QueryWorkflow, RagConfig, InMemoryVectorStore, HashEmbeddingProvider};
//!
//! let workflow = QueryWorkflow::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(HashEmbeddingProvider::new(384)))
//!     .vector_store(Arc::new(InMemoryVectorStore::new(384)))
//!     .build()?;
//!
//! let result = workflow.execute("what colour is the sky?").await?;
//! println!("{}", result.answer);
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use crate::config::{RagConfig, RetrievalFailurePolicy};
use crate::document::QueryResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::state::PipelineState;
use crate::steps::{AnswerStep, RetrieveStep};
use crate::vectorstore::VectorStore;

/// Sequences retrieval and answer generation for a single query.
///
/// Holds no per-query state, so one workflow can serve concurrent queries
/// behind an `Arc`. Construct one via [`QueryWorkflow::builder()`].
pub struct QueryWorkflow {
    retrieve: RetrieveStep,
    answer: AnswerStep,
    top_k: usize,
    failure_policy: RetrievalFailurePolicy,
}

impl QueryWorkflow {
    /// Create a new [`QueryWorkflowBuilder`].
    pub fn builder() -> QueryWorkflowBuilder {
        QueryWorkflowBuilder::default()
    }

    /// Whether the workflow can serve queries.
    ///
    /// A workflow only exists once [`QueryWorkflowBuilder::build`] has wired
    /// both steps, so this is always `true`; failed construction surfaces as
    /// an error from `build` instead.
    pub fn is_healthy(&self) -> bool {
        true
    }

    /// The default number of documents retrieved per query.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Run `query` with the configured `top_k`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::WorkflowError`] if retrieval fails under
    /// [`RetrievalFailurePolicy::FailFast`], or if a step leaves the state
    /// out of order.
    pub async fn execute(&self, query: &str) -> Result<QueryResult> {
        self.execute_with_top_k(query, self.top_k).await
    }

    /// Run `query`, retrieving at most `top_k` documents.
    pub async fn execute_with_top_k(&self, query: &str, top_k: usize) -> Result<QueryResult> {
        let started = Instant::now();
        let state = self.run(query, top_k).await?;
        let elapsed = started.elapsed();

        info!(
            result_count = state.retrieved_docs().len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "query completed"
        );
        state
            .into_result(elapsed)
            .map_err(|e| RagError::workflow(format!("workflow execution failed: {e}"), e))
    }

    /// Run both steps and return the finished state instead of a projection.
    pub async fn run(&self, query: &str, top_k: usize) -> Result<PipelineState> {
        let mut state = PipelineState::new(query);

        if let Err(e) = self.retrieve.run(&mut state, top_k).await {
            match self.failure_policy {
                RetrievalFailurePolicy::FailFast => return Err(e),
                RetrievalFailurePolicy::RenderError => {
                    warn!(error = %e, "retrieval failed, rendering error as answer");
                }
            }
        }

        self.answer
            .run(&mut state)
            .map_err(|e| RagError::workflow(format!("answer generation failed: {e}"), e))?;
        Ok(state)
    }
}

/// Builder for constructing a [`QueryWorkflow`].
///
/// `embedding_provider` and `vector_store` are required; `config` defaults to
/// [`RagConfig::default()`].
#[derive(Default)]
pub struct QueryWorkflowBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
}

impl QueryWorkflowBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Build the [`QueryWorkflow`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if a required field is missing, or if
    /// the config, provider and store disagree on vector dimensionality.
    pub fn build(self) -> Result<QueryWorkflow> {
        let config = self.config.unwrap_or_default();
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::ConfigError("vector_store is required".to_string()))?;

        if embedding_provider.dimensions() != vector_store.dimensions() {
            return Err(RagError::ConfigError(format!(
                "embedding dimension ({}) does not match vector store dimension ({})",
                embedding_provider.dimensions(),
                vector_store.dimensions()
            )));
        }
        if config.embedding_dim != embedding_provider.dimensions() {
            return Err(RagError::ConfigError(format!(
                "configured embedding_dim ({}) does not match embedding dimension ({})",
                config.embedding_dim,
                embedding_provider.dimensions()
            )));
        }

        Ok(QueryWorkflow {
            retrieve: RetrieveStep::new(embedding_provider, vector_store),
            answer: AnswerStep::new(config.answer_preview_chars),
            top_k: config.top_k,
            failure_policy: config.retrieval_failure_policy,
        })
    }
}
