//! Property tests for the in-memory vector store: dimension checks, what a
//! search hit carries, and listing order.

use bithealth_rag::RagError;
use bithealth_rag::document::{Document, Metadata};
use bithealth_rag::inmemory::InMemoryVectorStore;
use bithealth_rag::vectorstore::VectorStore;
use chrono::{DateTime, Duration, Utc};
use proptest::prelude::*;
use serde_json::json;

const DIM: usize = 8;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(future)
}

fn stored(
    index: usize,
    content: String,
    embedding: Vec<f32>,
    created_at: DateTime<Utc>,
) -> Document {
    let mut metadata = Metadata::new();
    metadata.insert("index".to_string(), json!(index));
    metadata.insert("tags".to_string(), json!(["stored", content.len()]));
    Document {
        id: format!("doc-{index}"),
        content,
        metadata: Some(metadata),
        embedding: Some(embedding),
        created_at,
        updated_at: created_at,
    }
}

/// Embeddings with at least one clearly non-zero component.
fn arb_embedding() -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0, DIM)
        .prop_filter("non-zero", |v| v.iter().any(|x| x.abs() > 1e-3))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn search_rejects_wrong_length_queries(dim in 1usize..64, delta in 1usize..8, longer: bool) {
        let query_len = if longer { dim + delta } else { dim.saturating_sub(delta) };
        let err = block_on(async {
            let store = InMemoryVectorStore::new(dim);
            store.search(&vec![0.5; query_len], 3).await.unwrap_err()
        });
        let is_store_error = matches!(err, RagError::VectorStoreError { .. });
        prop_assert!(is_store_error, "unexpected error: {:?}", err);
    }

    #[test]
    fn hits_carry_stored_content_and_metadata(
        entries in proptest::collection::vec(("[a-z ]{1,24}", arb_embedding()), 1..12),
        query in arb_embedding(),
        limit in 1usize..16,
    ) {
        let now = Utc::now();
        let documents: Vec<Document> = entries
            .into_iter()
            .enumerate()
            .map(|(i, (content, embedding))| stored(i, content, embedding, now))
            .collect();

        let hits = block_on(async {
            let store = InMemoryVectorStore::new(DIM);
            for document in &documents {
                store.upsert(document).await.unwrap();
            }
            store.search(&query, limit).await.unwrap()
        });

        prop_assert_eq!(hits.len(), limit.min(documents.len()));
        for hit in &hits {
            let source = documents.iter().find(|d| d.id == hit.id).unwrap();
            prop_assert_eq!(&hit.content, &source.content);
            prop_assert_eq!(&hit.metadata, &source.metadata);
            prop_assert!((-1.0001..=1.0001).contains(&hit.score), "score {}", hit.score);
        }
    }

    #[test]
    fn list_is_oldest_first_and_bounded(
        offsets in proptest::collection::hash_set(0i64..10_000, 1..16),
        limit in 0usize..20,
    ) {
        let base = Utc::now();
        let (listed, mut expected) = block_on(async {
            let store = InMemoryVectorStore::new(DIM);
            let mut expected = Vec::new();
            for (i, offset) in offsets.iter().enumerate() {
                let created_at = base + Duration::seconds(*offset);
                let document = stored(i, format!("entry {i}"), vec![1.0; DIM], created_at);
                expected.push((created_at, document.id.clone()));
                store.upsert(&document).await.unwrap();
            }
            (store.list(limit).await.unwrap(), expected)
        });

        expected.sort();
        let listed_ids: Vec<&str> = listed.iter().map(|d| d.id.as_str()).collect();
        let expected_ids: Vec<&str> =
            expected.iter().take(limit).map(|(_, id)| id.as_str()).collect();
        prop_assert_eq!(listed_ids, expected_ids);
    }
}
