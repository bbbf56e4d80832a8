//! CLI argument definitions for the `bithealth` binary.
//!
//! Every setting can come from a flag, an environment variable, or a `.env`
//! file loaded at startup. Priority: flag > env var > `.env` > default.

use std::path::PathBuf;

use bithealth_rag::{RagConfig, RetrievalFailurePolicy};
use clap::{Parser, Subcommand, ValueEnum};

/// BitHealth document ingestion and retrieval.
#[derive(Parser, Debug)]
#[command(name = "bithealth", version, about)]
pub struct Cli {
    /// Dimensionality of document embeddings.
    #[arg(long, env = "BITHEALTH_EMBEDDING_DIM", default_value_t = 384)]
    pub embedding_dim: usize,

    /// Name of the vector collection.
    #[arg(long, env = "BITHEALTH_COLLECTION", default_value = "documents")]
    pub collection: String,

    /// Documents retrieved per query when `--top-k` is not given.
    #[arg(long = "max-results", env = "BITHEALTH_TOP_K", default_value_t = 5)]
    pub max_results: usize,

    /// Render retrieval failures as the query answer instead of failing.
    #[arg(long, env = "BITHEALTH_RENDER_RETRIEVAL_ERRORS")]
    pub render_retrieval_errors: bool,

    /// Qdrant gRPC endpoint. Uses the in-memory index when unset.
    #[cfg(feature = "qdrant")]
    #[arg(long, env = "BITHEALTH_QDRANT_URL")]
    pub qdrant_url: Option<String>,

    /// Log output format.
    #[arg(long, env = "BITHEALTH_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// JSON file of documents to ingest before running the command.
    #[arg(long)]
    pub seed: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Build the validated pipeline configuration from the parsed arguments.
    pub fn rag_config(&self) -> bithealth_rag::Result<RagConfig> {
        let policy = if self.render_retrieval_errors {
            RetrievalFailurePolicy::RenderError
        } else {
            RetrievalFailurePolicy::FailFast
        };
        RagConfig::builder()
            .embedding_dim(self.embedding_dim)
            .collection_name(&self.collection)
            .top_k(self.max_results)
            .retrieval_failure_policy(policy)
            .build()
    }

    /// Human-readable name of the configured index backend.
    pub fn backend_name(&self) -> &'static str {
        #[cfg(feature = "qdrant")]
        let uses_qdrant = self.qdrant_url.is_some();
        #[cfg(not(feature = "qdrant"))]
        let uses_qdrant = false;

        if uses_qdrant { "qdrant" } else { "in-memory" }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ingest a single document.
    Ingest {
        /// Document text.
        content: String,
        /// Metadata as a JSON object.
        #[arg(long)]
        metadata: Option<String>,
    },
    /// Ingest every document in a JSON array file.
    BatchIngest {
        /// Path to a JSON array of `{"content": ..., "metadata": {...}}` objects.
        file: PathBuf,
    },
    /// Answer a query from the most similar documents.
    Query {
        /// Query text.
        text: String,
        /// Number of documents to retrieve.
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Show a stored document.
    Get { id: String },
    /// Delete a stored document.
    Delete { id: String },
    /// List stored documents.
    List {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Count stored documents.
    Count,
    /// Report index and workflow readiness.
    Health,
    /// Print the effective configuration.
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}
