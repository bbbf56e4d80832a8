//! End-to-end tests of the document service over the in-memory backend.

use std::sync::Arc;

use bithealth_rag::{
    DocumentInput, DocumentService, HashEmbeddingProvider, InMemoryVectorStore, IngestOutcome,
    Metadata, RagConfig, RagError,
};
use serde_json::json;

const DIM: usize = 64;

fn service() -> DocumentService {
    let config = RagConfig::builder().embedding_dim(DIM).build().unwrap();
    DocumentService::new(
        config,
        Arc::new(HashEmbeddingProvider::new(DIM)),
        Arc::new(InMemoryVectorStore::new(DIM)),
    )
    .unwrap()
}

fn metadata(value: serde_json::Value) -> Metadata {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

#[tokio::test]
async fn ingest_then_get_round_trips_content_and_metadata() {
    let service = service();
    let meta = metadata(json!({
        "source": "manual",
        "page": 4,
        "tags": ["a", "b"],
        "nested": {"ok": true},
    }));

    let id = service
        .ingest(DocumentInput::new("Aspirin reduces fever.").with_metadata(meta.clone()))
        .await
        .unwrap();

    let document = service.get(&id).await.unwrap();
    assert_eq!(document.id, id);
    assert_eq!(document.content, "Aspirin reduces fever.");
    assert_eq!(document.metadata, Some(meta));
    assert_eq!(document.embedding.as_ref().map(Vec::len), Some(DIM));
    assert_eq!(document.created_at, document.updated_at);
}

#[tokio::test]
async fn ingest_rejects_blank_content() {
    let service = service();
    let err = service.ingest(DocumentInput::new("   ")).await.unwrap_err();
    assert!(matches!(err, RagError::EmbeddingError { .. }), "got {err:?}");
    assert_eq!(service.count().await.unwrap(), 0);
}

#[tokio::test]
async fn query_on_empty_store_finds_nothing() {
    let service = service();
    let result = service.query("anything at all", None).await.unwrap();

    assert_eq!(result.query, "anything at all");
    assert!(result.documents.is_empty());
    assert_eq!(result.answer, "No relevant documents found.");
    assert!(result.processing_time >= 0.0);
}

#[tokio::test]
async fn query_answers_from_single_document() {
    let service = service();
    let id = service.ingest(DocumentInput::new("The sky is blue.")).await.unwrap();

    let result = service.query("What colour is the sky?", None).await.unwrap();
    assert!(result.answer.starts_with("Based on the document: The sky is blue...."));
    assert_eq!(result.documents.len(), 1);
    assert_eq!(result.documents[0].id, id);
}

#[tokio::test]
async fn answer_quotes_at_most_two_hundred_characters() {
    let service = service();
    let content = "x".repeat(500);
    service.ingest(DocumentInput::new(content)).await.unwrap();

    let result = service.query("long", None).await.unwrap();
    assert_eq!(result.answer, format!("Based on the document: {}...", "x".repeat(200)));
}

#[tokio::test]
async fn query_respects_top_k() {
    let service = service();
    for i in 0..8 {
        service.ingest(DocumentInput::new(format!("document number {i}"))).await.unwrap();
    }

    assert_eq!(service.query("document", None).await.unwrap().documents.len(), 5);
    assert_eq!(service.query("document", Some(3)).await.unwrap().documents.len(), 3);
    assert_eq!(service.query("document", Some(50)).await.unwrap().documents.len(), 8);

    let result = service.query("document", Some(8)).await.unwrap();
    for window in result.documents.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
}

#[tokio::test]
async fn query_rejects_zero_top_k() {
    let service = service();
    service.ingest(DocumentInput::new("The sky is blue.")).await.unwrap();

    let err = service.query("sky", Some(0)).await.unwrap_err();
    assert!(matches!(err, RagError::ConfigError(_)), "got {err:?}");
    assert_eq!(service.query("sky", Some(1)).await.unwrap().documents.len(), 1);
}

#[tokio::test]
async fn batch_ingest_isolates_failures() {
    let service = service();
    let outcomes = service
        .batch_ingest(vec![
            DocumentInput::new("first document"),
            DocumentInput::new(""),
            DocumentInput::new("third document"),
        ])
        .await;

    assert_eq!(outcomes.len(), 3);
    assert!(outcomes[0].is_success());
    assert!(matches!(&outcomes[1], IngestOutcome::Error { error } if !error.is_empty()));
    assert!(outcomes[2].is_success());

    for outcome in [&outcomes[0], &outcomes[2]] {
        let id = outcome.id().unwrap();
        assert!(service.get(id).await.is_ok());
    }
    assert_eq!(service.count().await.unwrap(), 2);

    let records = serde_json::to_value(&outcomes).unwrap();
    assert_eq!(records[0]["status"], "success");
    assert_eq!(records[1]["status"], "error");
    assert_eq!(records[2]["status"], "success");
}

#[tokio::test]
async fn delete_missing_document_is_not_found() {
    let service = service();
    let err = service.delete("does-not-exist").await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}

#[tokio::test]
async fn deleted_document_is_gone() {
    let service = service();
    let id = service.ingest(DocumentInput::new("temporary")).await.unwrap();

    service.delete(&id).await.unwrap();
    assert!(matches!(service.get(&id).await, Err(RagError::NotFound(missing)) if missing == id));
    assert!(service.delete(&id).await.unwrap_err().is_not_found());
    assert_eq!(service.count().await.unwrap(), 0);
}

#[tokio::test]
async fn list_and_count() {
    let service = service();
    for text in ["one", "two", "three"] {
        service.ingest(DocumentInput::new(text)).await.unwrap();
    }

    assert_eq!(service.count().await.unwrap(), 3);
    assert_eq!(service.list(10).await.unwrap().len(), 3);
    assert_eq!(service.list(2).await.unwrap().len(), 2);
    assert!(service.list(0).await.unwrap().is_empty());
}

#[tokio::test]
async fn health_reports_ready_components() {
    let service = service();
    service.ingest(DocumentInput::new("hello")).await.unwrap();

    let health = service.health().await;
    assert_eq!(health.status, "OK");
    assert_eq!(health.index, "connected");
    assert_eq!(health.workflow, "ready");
    assert_eq!(health.documents_count, 1);
}

#[test]
fn mismatched_dimensions_are_rejected_at_construction() {
    let result = DocumentService::new(
        RagConfig::default(),
        Arc::new(HashEmbeddingProvider::new(32)),
        Arc::new(InMemoryVectorStore::new(64)),
    );
    assert!(matches!(result, Err(RagError::ConfigError(_))));
}

#[test]
fn configured_dimension_must_match_components() {
    let result = DocumentService::new(
        RagConfig::default(),
        Arc::new(HashEmbeddingProvider::new(DIM)),
        Arc::new(InMemoryVectorStore::new(DIM)),
    );
    assert!(matches!(result, Err(RagError::ConfigError(_))));
}
