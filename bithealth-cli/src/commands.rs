//! Subcommand handlers. Each returns the JSON value printed to stdout.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, bail};
use bithealth_rag::{
    DocumentInput, DocumentService, HashEmbeddingProvider, InMemoryVectorStore, Metadata,
    RagConfig, VectorStore,
};
use serde_json::{Value, json};
use tracing::info;

use crate::cli::{Cli, Command};

/// Wire the embedder, index, and service from the parsed arguments.
pub async fn build_service(cli: &Cli, config: &RagConfig) -> anyhow::Result<DocumentService> {
    let embedder = Arc::new(HashEmbeddingProvider::new(config.embedding_dim));
    let store = build_store(cli, config).await?;
    let service = DocumentService::new(config.clone(), embedder, store)?;
    info!(backend = cli.backend_name(), collection = %config.collection_name, "service ready");
    Ok(service)
}

#[cfg(feature = "qdrant")]
async fn build_store(cli: &Cli, config: &RagConfig) -> anyhow::Result<Arc<dyn VectorStore>> {
    match &cli.qdrant_url {
        Some(url) => {
            let store = bithealth_rag::QdrantVectorStore::connect(
                url,
                &config.collection_name,
                config.embedding_dim,
            )
            .await
            .with_context(|| format!("failed to connect to Qdrant at {url}"))?;
            Ok(Arc::new(store))
        }
        None => Ok(Arc::new(InMemoryVectorStore::new(config.embedding_dim))),
    }
}

#[cfg(not(feature = "qdrant"))]
async fn build_store(_cli: &Cli, config: &RagConfig) -> anyhow::Result<Arc<dyn VectorStore>> {
    Ok(Arc::new(InMemoryVectorStore::new(config.embedding_dim)))
}

/// Read a JSON array of [`DocumentInput`] from `path`.
pub fn read_inputs(path: &Path) -> anyhow::Result<Vec<DocumentInput>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid document list in {}", path.display()))
}

fn parse_metadata(raw: &str) -> anyhow::Result<Metadata> {
    match serde_json::from_str::<Value>(raw).context("metadata is not valid JSON")? {
        Value::Object(map) => Ok(map),
        other => bail!("metadata must be a JSON object, got {other}"),
    }
}

/// Run one subcommand against `service`.
pub async fn execute(
    service: &DocumentService,
    config: &RagConfig,
    cli: &Cli,
) -> anyhow::Result<Value> {
    let value = match &cli.command {
        Command::Ingest { content, metadata } => {
            let mut input = DocumentInput::new(content.clone());
            if let Some(raw) = metadata {
                input = input.with_metadata(parse_metadata(raw)?);
            }
            let id = service.ingest(input).await?;
            json!({ "id": id, "message": "Document ingested successfully" })
        }
        Command::BatchIngest { file } => {
            let outcomes = service.batch_ingest(read_inputs(file)?).await;
            serde_json::to_value(outcomes)?
        }
        Command::Query { text, top_k } => serde_json::to_value(service.query(text, *top_k).await?)?,
        Command::Get { id } => serde_json::to_value(service.get(id).await?)?,
        Command::Delete { id } => {
            service.delete(id).await?;
            json!({ "message": format!("Document {id} deleted successfully") })
        }
        Command::List { limit } => serde_json::to_value(service.list(*limit).await?)?,
        Command::Count => json!({ "documents_count": service.count().await? }),
        Command::Health => serde_json::to_value(service.health().await)?,
        Command::Config => json!({
            "backend": cli.backend_name(),
            "collection_name": config.collection_name,
            "embedding_dim": config.embedding_dim,
            "max_retrieval_results": config.top_k,
            "answer_preview_chars": config.answer_preview_chars,
            "retrieval_failure_policy": config.retrieval_failure_policy,
        }),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    async fn run(service: &DocumentService, args: &[&str]) -> anyhow::Result<Value> {
        let cli = Cli::try_parse_from(std::iter::once("bithealth").chain(args.iter().copied()))?;
        let config = cli.rag_config()?;
        execute(service, &config, &cli).await
    }

    async fn service() -> DocumentService {
        let cli = Cli::try_parse_from(["bithealth", "--embedding-dim", "16", "count"]).unwrap();
        let config = cli.rag_config().unwrap();
        build_service(&cli, &config).await.unwrap()
    }

    #[tokio::test]
    async fn ingest_query_delete_flow() {
        let service = service().await;

        let args = [
            "--embedding-dim",
            "16",
            "ingest",
            "The sky is blue.",
            "--metadata",
            r#"{"lang":"en"}"#,
        ];
        let ingested = run(&service, &args)
        .await
        .unwrap();
        let id = ingested["id"].as_str().unwrap().to_string();

        let doc = run(&service, &["--embedding-dim", "16", "get", &id]).await.unwrap();
        assert_eq!(doc["metadata"]["lang"], "en");

        let result = run(&service, &["--embedding-dim", "16", "query", "sky"]).await.unwrap();
        assert_eq!(result["answer"], "Based on the document: The sky is blue....");

        run(&service, &["--embedding-dim", "16", "delete", &id]).await.unwrap();
        let err = run(&service, &["--embedding-dim", "16", "delete", &id]).await.unwrap_err();
        assert!(err.to_string().contains("not found"), "got {err}");
    }

    #[tokio::test]
    async fn metadata_must_be_an_object() {
        let service = service().await;
        let err = run(&service, &["--embedding-dim", "16", "ingest", "text", "--metadata", "[1]"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }

    #[tokio::test]
    async fn batch_ingest_reads_json_file() {
        let service = service().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("docs.json");
        std::fs::write(
            &path,
            r#"[{"content": "one"}, {"content": ""}, {"content": "three", "metadata": {"n": 3}}]"#,
        )
        .unwrap();

        let args = ["--embedding-dim", "16", "batch-ingest", path.to_str().unwrap()];
        let outcomes = run(&service, &args).await.unwrap();
        let statuses: Vec<&str> =
            outcomes.as_array().unwrap().iter().map(|o| o["status"].as_str().unwrap()).collect();
        assert_eq!(statuses, ["success", "error", "success"]);

        let count = run(&service, &["--embedding-dim", "16", "count"]).await.unwrap();
        assert_eq!(count["documents_count"], 2);
    }

    #[tokio::test]
    async fn config_reports_effective_settings() {
        let service = service().await;
        let config = run(&service, &["--embedding-dim", "16", "config"]).await.unwrap();
        assert_eq!(config["backend"], "in-memory");
        assert_eq!(config["embedding_dim"], 16);
        assert_eq!(config["retrieval_failure_policy"], "fail_fast");
    }
}
