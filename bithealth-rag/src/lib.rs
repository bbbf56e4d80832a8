//! Document ingestion and retrieval for BitHealth.
//!
//! This crate provides:
//! - Deterministic text embeddings ([`HashEmbeddingProvider`]) behind the
//!   [`EmbeddingProvider`] trait
//! - A [`VectorStore`] similarity index contract with an in-memory backend
//!   and an optional Qdrant backend (`qdrant` feature)
//! - A two-step query workflow (retrieve, then answer) over a typed
//!   [`PipelineState`] with validated stage transitions
//! - [`DocumentService`], the caller-facing operation set

pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod hashing;
pub mod inmemory;
#[cfg(feature = "qdrant")]
pub mod qdrant;
pub mod service;
pub mod state;
pub mod steps;
pub mod vectorstore;
pub mod workflow;

pub use config::{RagConfig, RagConfigBuilder, RetrievalFailurePolicy};
pub use document::{
    Document, DocumentInput, HealthStatus, IngestOutcome, Metadata, QueryResult,
    RetrievedDocument,
};
pub use embedding::{EmbeddingProvider, cosine_similarity};
pub use error::{RagError, Result};
pub use hashing::HashEmbeddingProvider;
pub use inmemory::InMemoryVectorStore;
#[cfg(feature = "qdrant")]
pub use qdrant::QdrantVectorStore;
pub use service::DocumentService;
pub use state::{PipelineState, WorkflowStage};
pub use steps::{AnswerStep, RetrieveStep};
pub use vectorstore::VectorStore;
pub use workflow::{QueryWorkflow, QueryWorkflowBuilder};
