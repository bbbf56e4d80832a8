//! Qdrant vector store backend.
//!
//! Provides [`QdrantVectorStore`] which implements [`VectorStore`] using
//! the [qdrant-client](https://docs.rs/qdrant-client) crate over gRPC.
//!
//! # Example
//!
//! ```rust,ignore
//! use bithealth_rag::qdrant::QdrantVectorStore;
//!
//! let store = QdrantVectorStore::connect("http://localhost:6334", "documents", 384).await?;
//! store.upsert(&document).await?;
//! let results = store.search(&query_embedding, 5).await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, DeletePointsBuilder, Distance,
    GetPointsBuilder, PointId, PointStruct, PointsIdsList, RetrievedPoint, ScrollPointsBuilder,
    SearchPointsBuilder, UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::{Map, Value, json};
use tracing::debug;
use uuid::Uuid;

use crate::document::{Document, Metadata, RetrievedDocument};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// A [`VectorStore`] backed by a single [Qdrant](https://qdrant.tech/) collection.
///
/// The collection uses cosine distance. Document content, metadata and
/// timestamps are stored as point payload; the point ID is the document ID,
/// which must therefore be a UUID.
pub struct QdrantVectorStore {
    client: Qdrant,
    collection: String,
    dimensions: usize,
}

impl QdrantVectorStore {
    /// Connect to Qdrant at `url` and ensure `collection` exists with
    /// vectors of length `dimensions`.
    pub async fn connect(url: &str, collection: &str, dimensions: usize) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(Self::map_err)?;
        Self::from_client(client, collection, dimensions).await
    }

    /// Wrap an existing client, ensuring the collection exists.
    pub async fn from_client(client: Qdrant, collection: &str, dimensions: usize) -> Result<Self> {
        let store = Self { client, collection: collection.to_string(), dimensions };
        store.ensure_collection().await?;
        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<()> {
        let exists =
            self.client.collection_exists(self.collection.as_str()).await.map_err(Self::map_err)?;
        if exists {
            debug!(
                collection = %self.collection,
                "qdrant collection already exists, skipping creation"
            );
            return Ok(());
        }

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimensions as u64, Distance::Cosine),
                ),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(
            collection = %self.collection,
            dimensions = self.dimensions,
            "created qdrant collection"
        );
        Ok(())
    }

    fn map_err(e: qdrant_client::QdrantError) -> RagError {
        RagError::VectorStoreError { backend: "qdrant".to_string(), message: e.to_string() }
    }

    fn check_dimensions(&self, len: usize) -> Result<()> {
        if len != self.dimensions {
            return Err(RagError::VectorStoreError {
                backend: "qdrant".to_string(),
                message: format!(
                    "vector dimension mismatch: expected {}, got {len}",
                    self.dimensions
                ),
            });
        }
        Ok(())
    }

    /// Point IDs are UUIDs, so any other ID cannot name a stored point.
    fn point_id(id: &str) -> Option<PointId> {
        Uuid::parse_str(id).ok().map(|uuid| PointId::from(uuid.to_string()))
    }

    fn point_id_string(id: Option<&PointId>) -> String {
        id.and_then(|pid| match &pid.point_id_options {
            Some(PointIdOptions::Uuid(s)) => Some(s.clone()),
            Some(PointIdOptions::Num(n)) => Some(n.to_string()),
            None => None,
        })
        .unwrap_or_default()
    }

    fn extract_string(payload: &HashMap<String, QdrantValue>, key: &str) -> Option<String> {
        match payload.get(key).and_then(|v| v.kind.as_ref()) {
            Some(Kind::StringValue(s)) => Some(s.clone()),
            _ => None,
        }
    }

    fn extract_metadata(payload: &HashMap<String, QdrantValue>) -> Option<Metadata> {
        match payload.get("metadata").map(to_json) {
            Some(Value::Object(map)) if !map.is_empty() => Some(map),
            _ => None,
        }
    }

    fn extract_timestamp(payload: &HashMap<String, QdrantValue>, key: &str) -> DateTime<Utc> {
        Self::extract_string(payload, key)
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(Utc::now)
    }

    fn to_document(point: RetrievedPoint) -> Document {
        Document {
            id: Self::point_id_string(point.id.as_ref()),
            content: Self::extract_string(&point.payload, "content").unwrap_or_default(),
            metadata: Self::extract_metadata(&point.payload),
            embedding: None,
            created_at: Self::extract_timestamp(&point.payload, "created_at"),
            updated_at: Self::extract_timestamp(&point.payload, "updated_at"),
        }
    }
}

/// Convert a Qdrant payload value into JSON.
fn to_json(value: &QdrantValue) -> Value {
    match &value.kind {
        None | Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(*b),
        Some(Kind::IntegerValue(i)) => json!(i),
        Some(Kind::DoubleValue(d)) => json!(d),
        Some(Kind::StringValue(s)) => Value::String(s.clone()),
        Some(Kind::ListValue(list)) => Value::Array(list.values.iter().map(to_json).collect()),
        Some(Kind::StructValue(s)) => {
            Value::Object(s.fields.iter().map(|(k, v)| (k.clone(), to_json(v))).collect())
        }
    }
}

#[async_trait]
impl VectorStore for QdrantVectorStore {
    async fn upsert(&self, document: &Document) -> Result<()> {
        let embedding = document.embedding.as_ref().ok_or_else(|| RagError::VectorStoreError {
            backend: "qdrant".to_string(),
            message: "Document must have embedding".to_string(),
        })?;
        self.check_dimensions(embedding.len())?;

        let mut payload_map = Map::new();
        payload_map.insert("id".to_string(), Value::String(document.id.clone()));
        payload_map.insert("content".to_string(), Value::String(document.content.clone()));
        payload_map.insert(
            "metadata".to_string(),
            Value::Object(document.metadata.clone().unwrap_or_default()),
        );
        payload_map
            .insert("created_at".to_string(), Value::String(document.created_at.to_rfc3339()));
        payload_map
            .insert("updated_at".to_string(), Value::String(document.updated_at.to_rfc3339()));
        let payload = Payload::try_from(Value::Object(payload_map)).map_err(Self::map_err)?;

        let point = PointStruct::new(document.id.clone(), embedding.clone(), payload);
        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await
            .map_err(Self::map_err)?;

        debug!(
            collection = %self.collection,
            document.id = %document.id,
            "upserted document to qdrant"
        );
        Ok(())
    }

    async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<RetrievedDocument>> {
        self.check_dimensions(embedding.len())?;

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, embedding.to_vec(), limit as u64)
                    .with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| RetrievedDocument {
                id: Self::point_id_string(scored.id.as_ref()),
                content: Self::extract_string(&scored.payload, "content").unwrap_or_default(),
                metadata: Self::extract_metadata(&scored.payload),
                score: scored.score,
            })
            .collect();

        Ok(results)
    }

    async fn get(&self, id: &str) -> Result<Option<Document>> {
        let Some(point_id) = Self::point_id(id) else {
            return Ok(None);
        };
        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(&self.collection, vec![point_id]).with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        Ok(response.result.into_iter().next().map(Self::to_document))
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        let Some(point_id) = Self::point_id(id) else {
            return Ok(false);
        };
        if self.get(id).await?.is_none() {
            return Ok(false);
        }

        self.client
            .delete_points(
                DeletePointsBuilder::new(&self.collection)
                    .points(PointsIdsList { ids: vec![point_id] })
                    .wait(true),
            )
            .await
            .map_err(Self::map_err)?;

        debug!(collection = %self.collection, document.id = id, "deleted point from qdrant");
        Ok(true)
    }

    async fn list(&self, limit: usize) -> Result<Vec<Document>> {
        let response = self
            .client
            .scroll(
                ScrollPointsBuilder::new(&self.collection).limit(limit as u32).with_payload(true),
            )
            .await
            .map_err(Self::map_err)?;

        Ok(response.result.into_iter().map(Self::to_document).collect())
    }

    async fn count(&self) -> Result<usize> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(Self::map_err)?;

        Ok(response.result.map(|r| r.count as usize).unwrap_or_default())
    }

    async fn health(&self) -> bool {
        self.client.collection_exists(self.collection.as_str()).await.unwrap_or(false)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
