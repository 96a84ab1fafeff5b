//! # Application State & Configuration
//!
//! Shared state for the Axum application: configuration, the evaluation
//! pipeline, and the service clients the corpus-ingestion path needs
//! directly. Everything is `Arc`-shared and cheap to clone per request.
//!
//! Configuration comes from `GEOLEX_*` environment variables with local
//! development defaults, so a bare `geolex-api` binary talks to a local
//! Ollama and an in-memory feature store.

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::postgres::PgPool;

use geolex_pipeline::{ComplianceEvaluator, FeatureStore};
use geolex_rag::{DocumentStore, EmbeddingService, JudgmentService};

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Port the HTTP server binds.
    pub port: u16,
    /// Base URL of the model server hosting both embedding and chat
    /// endpoints (e.g., a local Ollama).
    pub model_base_url: String,
    /// Embedding model name.
    pub embedding_model: String,
    /// Judgment (chat) model name.
    pub judge_model: String,
    /// Base URL of the vector document store.
    pub store_base_url: String,
    /// API key for the document store.
    pub store_api_key: String,
    /// Path of the legal-corpus JSON file for `/v1/corpus/ingest`.
    pub corpus_path: PathBuf,
}

impl AppConfig {
    /// Read configuration from `GEOLEX_*` environment variables, with
    /// defaults suitable for local development.
    pub fn from_env() -> Self {
        Self {
            port: std::env::var("GEOLEX_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            model_base_url: env_or("GEOLEX_MODEL_URL", "http://localhost:11434"),
            embedding_model: env_or("GEOLEX_EMBEDDING_MODEL", "nomic-embed-text"),
            judge_model: env_or("GEOLEX_JUDGE_MODEL", "llama3.2"),
            store_base_url: env_or("GEOLEX_STORE_URL", "http://localhost:54321"),
            store_api_key: env_or("GEOLEX_STORE_API_KEY", ""),
            corpus_path: PathBuf::from(env_or(
                "GEOLEX_CORPUS_PATH",
                "corpus/legal_documents.json",
            )),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Check if metrics are enabled via the `GEOLEX_METRICS_ENABLED` env var.
/// Defaults to `true` when the variable is absent or set to anything other
/// than `"false"`.
pub fn metrics_enabled() -> bool {
    std::env::var("GEOLEX_METRICS_ENABLED")
        .map(|v| v.to_lowercase() != "false")
        .unwrap_or(true)
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration.
    pub config: AppConfig,
    /// The compliance evaluation pipeline.
    pub evaluator: ComplianceEvaluator,
    /// Embedding client, used directly by corpus ingestion.
    pub embedder: Arc<dyn EmbeddingService>,
    /// Document store client, used directly by corpus ingestion.
    pub documents: Arc<dyn DocumentStore>,
    /// Feature store, used directly by the listing endpoint.
    pub features: Arc<dyn FeatureStore>,
    /// Postgres pool when `DATABASE_URL` is configured; `None` in
    /// in-memory mode.
    pub db_pool: Option<PgPool>,
}

impl AppState {
    /// Assemble state from explicit collaborators. Tests inject fakes
    /// here; `main` wires the HTTP adapters.
    pub fn new(
        config: AppConfig,
        judge: Arc<dyn JudgmentService>,
        embedder: Arc<dyn EmbeddingService>,
        documents: Arc<dyn DocumentStore>,
        features: Arc<dyn FeatureStore>,
        db_pool: Option<PgPool>,
    ) -> Self {
        let evaluator = ComplianceEvaluator::new(
            judge,
            Arc::clone(&embedder),
            Arc::clone(&documents),
            Arc::clone(&features),
        );
        Self {
            config,
            evaluator,
            embedder,
            documents,
            features,
            db_pool,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_are_local_development() {
        // Only assert on variables this test does not set — the suite may
        // run with an inherited environment.
        let cfg = AppConfig::from_env();
        assert!(!cfg.model_base_url.is_empty());
        assert!(!cfg.embedding_model.is_empty());
        assert!(cfg.port > 0);
    }
}
