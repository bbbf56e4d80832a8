//! Error types for the `bithealth-rag` crate.

use thiserror::Error;

use crate::state::WorkflowStage;

/// Errors that can occur in ingestion and retrieval operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// An error occurred during embedding generation or comparison.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The requested document does not exist.
    #[error("Document with ID {0} not found")]
    NotFound(String),

    /// A failure inside the retrieve/answer sequence.
    #[error("Workflow error: {message}")]
    WorkflowError {
        /// A description of the step that failed.
        message: String,
        /// The underlying cause.
        #[source]
        source: Box<RagError>,
    },

    /// The query workflow attempted a stage transition it does not allow.
    #[error("Invalid workflow transition: {from} -> {to}")]
    InvalidTransition {
        /// The stage the workflow was in.
        from: WorkflowStage,
        /// The stage it attempted to enter.
        to: WorkflowStage,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RagError {
    /// Wrap `cause` as a [`RagError::WorkflowError`].
    pub fn workflow(message: impl Into<String>, cause: RagError) -> Self {
        Self::WorkflowError { message: message.into(), source: Box::new(cause) }
    }

    /// Returns `true` if this error, or the cause it wraps, is a not-found condition.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound(_) => true,
            Self::WorkflowError { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
