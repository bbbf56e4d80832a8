//! Configuration for the ingestion and query pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// What the query workflow does when the retrieval step fails.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalFailurePolicy {
    /// Abort the query and return the failure as a workflow error.
    #[default]
    FailFast,
    /// Record the failure in the pipeline state and let the answer step
    /// render it as the answer text.
    RenderError,
}

/// Configuration parameters for the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Dimensionality of embeddings and of the vector collection.
    pub embedding_dim: usize,
    /// Name of the vector collection holding documents.
    pub collection_name: String,
    /// Number of top results to retrieve when the caller does not specify one.
    pub top_k: usize,
    /// Number of characters of the top document quoted in the answer.
    pub answer_preview_chars: usize,
    /// Behaviour of the query workflow when retrieval fails.
    pub retrieval_failure_policy: RetrievalFailurePolicy,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            embedding_dim: 384,
            collection_name: "documents".to_string(),
            top_k: 5,
            answer_preview_chars: 200,
            retrieval_failure_policy: RetrievalFailurePolicy::FailFast,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the embedding dimensionality.
    pub fn embedding_dim(mut self, dim: usize) -> Self {
        self.config.embedding_dim = dim;
        self
    }

    /// Set the vector collection name.
    pub fn collection_name(mut self, name: impl Into<String>) -> Self {
        self.config.collection_name = name.into();
        self
    }

    /// Set the default number of results retrieved per query.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set how many characters of the top document the answer quotes.
    pub fn answer_preview_chars(mut self, chars: usize) -> Self {
        self.config.answer_preview_chars = chars;
        self
    }

    /// Set the retrieval failure policy.
    pub fn retrieval_failure_policy(mut self, policy: RetrievalFailurePolicy) -> Self {
        self.config.retrieval_failure_policy = policy;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `embedding_dim == 0`
    /// - `top_k == 0`
    /// - `collection_name` is blank
    pub fn build(self) -> Result<RagConfig> {
        if self.config.embedding_dim == 0 {
            return Err(RagError::ConfigError(
                "embedding_dim must be greater than zero".to_string(),
            ));
        }
        if self.config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if self.config.collection_name.trim().is_empty() {
            return Err(RagError::ConfigError("collection_name must not be empty".to_string()));
        }
        Ok(self.config)
    }
}
