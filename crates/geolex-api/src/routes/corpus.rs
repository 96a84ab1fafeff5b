//! # Corpus Ingestion API
//!
//! Route:
//! - POST /v1/corpus/ingest — embed and store the configured legal-corpus
//!   file into the document store
//!
//! This is operator tooling for (re)seeding the knowledge bases, not part
//! of the evaluation path. Documents that fail to embed or insert are
//! counted and logged individually; the run continues through the file.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use geolex_core::CorpusDocument;

use crate::error::AppError;
use crate::state::AppState;

/// Build the corpus ingestion router.
pub fn router() -> Router<AppState> {
    Router::new().route("/v1/corpus/ingest", post(ingest_corpus))
}

/// Ingestion run summary.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IngestResponse {
    /// Documents embedded and stored.
    pub processed: usize,
    /// Documents that failed embedding or insertion.
    pub failed: usize,
}

/// POST /v1/corpus/ingest — bulk-ingest the configured corpus file.
#[utoipa::path(
    post,
    path = "/v1/corpus/ingest",
    responses(
        (status = 200, description = "Ingestion summary", body = IngestResponse),
        (status = 500, description = "Corpus file unreadable or unparseable", body = crate::error::ErrorBody),
    ),
    tag = "corpus"
)]
async fn ingest_corpus(State(state): State<AppState>) -> Result<Json<IngestResponse>, AppError> {
    let path = &state.config.corpus_path;
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| AppError::Internal(format!("failed to read corpus file {path:?}: {e}")))?;

    let docs: Vec<CorpusDocument> = serde_json::from_str(&raw)
        .map_err(|e| AppError::Internal(format!("failed to parse corpus file {path:?}: {e}")))?;

    let mut processed = 0usize;
    let mut failed = 0usize;
    for doc in &docs {
        match ingest_one(&state, doc).await {
            Ok(()) => processed += 1,
            Err(e) => {
                failed += 1;
                tracing::error!(kb = %doc.metadata.kb, error = %e, "failed to ingest corpus document");
            }
        }
    }

    tracing::info!(processed, failed, "corpus ingestion finished");
    Ok(Json(IngestResponse { processed, failed }))
}

async fn ingest_one(state: &AppState, doc: &CorpusDocument) -> Result<(), AppError> {
    let vector = state
        .embedder
        .embed(&doc.text)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;
    state
        .documents
        .insert(doc, &vector)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
}
