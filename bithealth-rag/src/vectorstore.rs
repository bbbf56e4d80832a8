//! Vector store trait for storing and searching document embeddings.

use async_trait::async_trait;

use crate::document::{Document, RetrievedDocument};
use crate::error::Result;

/// A similarity index holding documents and their embeddings.
///
/// A store is bound to a single collection whose vector dimensionality is
/// fixed when the store is created. Every stored and query vector must match
/// [`dimensions`](VectorStore::dimensions) exactly; implementations reject
/// mismatches with [`RagError::VectorStoreError`](crate::RagError::VectorStoreError).
///
/// Implementations must be safe to share across concurrent queries.
///
/// # Example
///
/// ```rust,ignore
/// use bithealth_rag::{InMemoryVectorStore, VectorStore};
///
/// let store = InMemoryVectorStore::new(384);
/// store.upsert(&document).await?;
/// let results = store.search(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace a document. The document must carry an embedding.
    async fn upsert(&self, document: &Document) -> Result<()>;

    /// Search for the `limit` most similar documents to `embedding`.
    ///
    /// Returns results ordered by descending similarity score.
    async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<RetrievedDocument>>;

    /// Fetch a document by ID. Returns `Ok(None)` if it does not exist.
    async fn get(&self, id: &str) -> Result<Option<Document>>;

    /// Delete a document by ID. Returns `true` if a document was removed.
    async fn delete(&self, id: &str) -> Result<bool>;

    /// List up to `limit` stored documents.
    async fn list(&self, limit: usize) -> Result<Vec<Document>>;

    /// Count stored documents.
    async fn count(&self) -> Result<usize>;

    /// Whether the backend is reachable and its collection exists.
    async fn health(&self) -> bool;

    /// The vector dimensionality of this store's collection.
    fn dimensions(&self) -> usize;
}
