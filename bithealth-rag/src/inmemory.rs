//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a vector store backed by a
//! `HashMap` protected by a `tokio::sync::RwLock`. It is suitable for
//! development, testing, and small-scale use cases. Nothing is persisted.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Document, RetrievedDocument};
use crate::embedding::cosine_similarity;
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "InMemory";

/// An in-memory vector store using cosine similarity for search.
///
/// Documents are keyed by ID. All operations are async-safe via
/// `tokio::sync::RwLock`, so a single store can be shared between
/// concurrent queries behind an `Arc`.
///
/// # Example
///
/// ```rust,ignore
/// use bithealth_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new(384);
/// assert_eq!(store.count().await?, 0);
/// ```
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dimensions: usize,
    documents: RwLock<HashMap<String, Document>>,
}

impl InMemoryVectorStore {
    /// Create a new empty store accepting vectors of length `dimensions`.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, documents: RwLock::new(HashMap::new()) }
    }

    fn check_dimensions(&self, len: usize) -> Result<()> {
        if len != self.dimensions {
            return Err(RagError::VectorStoreError {
                backend: BACKEND.to_string(),
                message: format!(
                    "vector dimension mismatch: expected {}, got {len}",
                    self.dimensions
                ),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, document: &Document) -> Result<()> {
        let embedding = document.embedding.as_ref().ok_or_else(|| RagError::VectorStoreError {
            backend: BACKEND.to_string(),
            message: format!("document '{}' must have an embedding", document.id),
        })?;
        self.check_dimensions(embedding.len())?;

        let mut documents = self.documents.write().await;
        documents.insert(document.id.clone(), document.clone());
        debug!(document.id = %document.id, "upserted document");
        Ok(())
    }

    async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<RetrievedDocument>> {
        self.check_dimensions(embedding.len())?;

        let documents = self.documents.read().await;
        let mut scored = Vec::with_capacity(documents.len());
        for document in documents.values() {
            let Some(stored) = document.embedding.as_deref() else { continue };
            scored.push(RetrievedDocument {
                id: document.id.clone(),
                content: document.content.clone(),
                metadata: document.metadata.clone(),
                score: cosine_similarity(stored, embedding)?,
            });
        }

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);
        Ok(scored)
    }

    async fn get(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        Ok(self.documents.write().await.remove(id).is_some())
    }

    async fn list(&self, limit: usize) -> Result<Vec<Document>> {
        let documents = self.documents.read().await;
        let mut listed: Vec<Document> = documents.values().cloned().collect();
        listed.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        listed.truncate(limit);
        Ok(listed)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.read().await.len())
    }

    async fn health(&self) -> bool {
        true
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
