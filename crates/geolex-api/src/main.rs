//! GeoLex API server binary.
//!
//! Wires the HTTP service adapters and the feature store (Postgres when
//! `DATABASE_URL` is set, in-memory otherwise), then serves the app.

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use geolex_api::db::features::PgFeatureStore;
use geolex_api::{AppConfig, AppState};
use geolex_pipeline::{FeatureStore, MemoryFeatureStore};
use geolex_rag::{
    EmbeddingConfig, HttpChatJudge, HttpEmbedder, HttpVectorStore, JudgeConfig, VectorStoreConfig,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();

    let judge = Arc::new(
        HttpChatJudge::new(JudgeConfig::new(
            config.model_base_url.clone(),
            config.judge_model.clone(),
        ))
        .context("building judgment client")?,
    );
    let embedder = Arc::new(
        HttpEmbedder::new(EmbeddingConfig::new(
            config.model_base_url.clone(),
            config.embedding_model.clone(),
        ))
        .context("building embedding client")?,
    );
    let documents = Arc::new(
        HttpVectorStore::new(VectorStoreConfig::new(
            config.store_base_url.clone(),
            config.store_api_key.clone(),
        ))
        .context("building document store client")?,
    );

    let db_pool = geolex_api::db::init_pool()
        .await
        .context("initializing database")?;
    let features: Arc<dyn FeatureStore> = match &db_pool {
        Some(pool) => Arc::new(PgFeatureStore::new(pool.clone())),
        None => Arc::new(MemoryFeatureStore::new()),
    };

    let port = config.port;
    let state = AppState::new(config, judge, embedder, documents, features, db_pool);
    let app = geolex_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "GeoLex API listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}
