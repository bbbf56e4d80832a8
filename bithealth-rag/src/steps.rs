//! The two steps of the query workflow: retrieval and answer generation.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::RetrievedDocument;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::state::PipelineState;
use crate::vectorstore::VectorStore;

/// Answer used when retrieval returned nothing.
pub const NO_DOCUMENTS_ANSWER: &str = "No relevant documents found.";

/// Embeds the query and searches the vector store for similar documents.
#[derive(Clone)]
pub struct RetrieveStep {
    embedding_provider: Arc<dyn EmbeddingProvider>,
    vector_store: Arc<dyn VectorStore>,
}

impl RetrieveStep {
    pub fn new(
        embedding_provider: Arc<dyn EmbeddingProvider>,
        vector_store: Arc<dyn VectorStore>,
    ) -> Self {
        Self { embedding_provider, vector_store }
    }

    /// Fill `state` with the `top_k` documents most similar to its query.
    ///
    /// # Errors
    ///
    /// On embedding or search failure, records `"Retrieval failed: <cause>"`
    /// in the state and returns a [`RagError::WorkflowError`] wrapping the cause.
    pub async fn run(&self, state: &mut PipelineState, top_k: usize) -> Result<()> {
        let docs = match self.search(state.query(), top_k).await {
            Ok(docs) => docs,
            Err(e) => {
                error!(error = %e, "retrieval failed");
                state.record_error(format!("Retrieval failed: {e}"));
                return Err(RagError::workflow("workflow retrieval failed", e));
            }
        };
        debug!(result_count = docs.len(), top_k, "retrieved documents");
        state.record_retrieval(docs)
    }

    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let query_embedding = self.embedding_provider.embed(query).await?;
        self.vector_store.search(&query_embedding, top_k).await
    }
}

/// Derives the answer text from the retrieved documents.
///
/// Composing an answer never fails. Recording it only fails when the state
/// is out of order: already answered, or neither retrieved nor failed.
#[derive(Debug, Clone, Copy)]
pub struct AnswerStep {
    preview_chars: usize,
}

impl AnswerStep {
    /// Create an answer step quoting up to `preview_chars` characters of the top document.
    pub fn new(preview_chars: usize) -> Self {
        Self { preview_chars }
    }

    /// Compose the answer for `state`, in priority order: recorded error,
    /// no documents, then a preview of the top-ranked document.
    pub fn compose(&self, state: &PipelineState) -> String {
        if let Some(error) = state.error() {
            return format!("Error occurred: {error}");
        }
        match state.retrieved_docs().first() {
            None => NO_DOCUMENTS_ANSWER.to_string(),
            Some(top) => {
                let preview: String = top.content.chars().take(self.preview_chars).collect();
                format!("Based on the document: {preview}...")
            }
        }
    }

    /// Write the composed answer into `state` and mark it answered.
    pub fn run(&self, state: &mut PipelineState) -> Result<()> {
        let answer = self.compose(state);
        state.record_answer(answer)
    }
}

impl Default for AnswerStep {
    fn default() -> Self {
        Self::new(200)
    }
}
