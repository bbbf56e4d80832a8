//! Data types for documents, retrieval results, and service responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Open key-value metadata attached to a document.
///
/// Values may be any JSON value, including nested objects and arrays.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A stored document with its content, metadata, and embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document. Never changes once stored.
    pub id: String,
    /// The text content of the document.
    pub content: String,
    /// Optional metadata supplied at ingestion time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// The vector embedding of `content`, if generated or returned by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    /// When the document was first stored.
    pub created_at: DateTime<Utc>,
    /// When the document was last written.
    pub updated_at: DateTime<Utc>,
}

/// A request to ingest a single document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DocumentInput {
    /// The text content to store.
    pub content: String,
    /// Optional metadata to store alongside the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl DocumentInput {
    /// Create an input with content and no metadata.
    pub fn new(content: impl Into<String>) -> Self {
        Self { content: content.into(), metadata: None }
    }

    /// Attach metadata to this input.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A document returned by similarity search, paired with its score.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievedDocument {
    /// The ID of the stored document.
    pub id: String,
    /// The text content of the stored document.
    pub content: String,
    /// The stored metadata, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    /// The similarity score (higher is more similar).
    pub score: f32,
}

/// The terminal output of a query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryResult {
    /// The query text as submitted.
    pub query: String,
    /// Retrieved documents, ordered by descending score.
    pub documents: Vec<RetrievedDocument>,
    /// The generated answer text.
    pub answer: String,
    /// Wall-clock time spent in retrieval and answer generation, in seconds.
    pub processing_time: f64,
}

/// The outcome of ingesting one item of a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum IngestOutcome {
    /// The document was stored under `id`.
    Success {
        /// The ID assigned to the stored document.
        id: String,
    },
    /// The document could not be stored.
    Error {
        /// A description of the failure.
        error: String,
    },
}

impl IngestOutcome {
    /// Returns `true` if the item was stored.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The assigned ID, if the item was stored.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Success { id } => Some(id),
            Self::Error { .. } => None,
        }
    }
}

/// Readiness report for the service and its collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    /// `"OK"` when the index and workflow are both ready, `"unhealthy"` otherwise.
    pub status: String,
    /// `"connected"` or `"disconnected"`.
    pub index: String,
    /// `"ready"` or `"not ready"`.
    pub workflow: String,
    /// Number of stored documents, or zero if the count failed.
    pub documents_count: usize,
}
