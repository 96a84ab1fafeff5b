//! # Feature Evaluation API
//!
//! Routes:
//! - POST /v1/features — evaluate one feature and persist the verdict
//! - GET  /v1/features — list stored feature records
//! - POST /v1/features/batch — CSV import, one evaluation per row
//!
//! The single-feature endpoint is a thin shell over the pipeline: field
//! presence checks, then `ComplianceEvaluator::evaluate`, then response
//! shaping. The batch endpoint iterates rows and collects per-row
//! outcomes — one bad row never fails the import.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use geolex_core::FeatureSubmission;
use geolex_pipeline::StoredFeature;

use crate::error::AppError;
use crate::state::AppState;

/// Build the feature evaluation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/features", post(evaluate_feature).get(list_features))
        .route("/v1/features/batch", post(evaluate_batch))
}

/// Request body for feature evaluation.
///
/// Fields are optional at the serde level so that missing keys produce a
/// 400 with a useful message instead of a deserialization rejection.
#[derive(Debug, Deserialize, ToSchema)]
pub struct FeatureRequest {
    /// The feature title.
    pub title: Option<String>,
    /// The feature description.
    pub description: Option<String>,
}

/// A stored feature record as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeatureRecord {
    /// Store-generated identifier.
    pub id: Uuid,
    /// The feature title.
    pub feature: String,
    /// The feature description.
    pub description: String,
    /// Per-region verdict map with exactly the five region keys; values
    /// are `true`, `false`, or `"unknown"`.
    #[serde(rename = "isCompliant")]
    #[schema(value_type = Object)]
    pub is_compliant: serde_json::Value,
    /// Reasoning text from the model or the short-circuit path.
    pub reason: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl From<StoredFeature> for FeatureRecord {
    fn from(stored: StoredFeature) -> Self {
        Self {
            id: stored.id,
            feature: stored.feature,
            description: stored.description,
            // ComplianceMap serialization is infallible: string keys,
            // bool/string values.
            is_compliant: serde_json::to_value(&stored.is_compliant)
                .unwrap_or_else(|_| serde_json::json!({})),
            reason: stored.reason,
            created_at: stored.created_at,
        }
    }
}

/// Response for a successful evaluation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeatureResponse {
    /// The stored record.
    pub feature: FeatureRecord,
    /// Reasoning text, duplicated at the top level for UI convenience.
    pub reason: String,
}

/// POST /v1/features — evaluate one feature.
#[utoipa::path(
    post,
    path = "/v1/features",
    request_body = FeatureRequest,
    responses(
        (status = 200, description = "Feature evaluated and stored", body = FeatureResponse),
        (status = 400, description = "Missing fields or input is not a meaningful feature", body = crate::error::ErrorBody),
        (status = 500, description = "Embedding, judgment, or persistence failure", body = crate::error::ErrorBody),
    ),
    tag = "features"
)]
async fn evaluate_feature(
    State(state): State<AppState>,
    Json(req): Json<FeatureRequest>,
) -> Result<Json<FeatureResponse>, AppError> {
    let (title, description) = match (req.title, req.description) {
        (Some(t), Some(d)) => (t, d),
        _ => {
            return Err(AppError::BadRequest(
                "Missing required fields: title, description".to_string(),
            ))
        }
    };

    let submission = FeatureSubmission::new(title, description)?;
    let stored = state.evaluator.evaluate(&submission).await?;

    let reason = stored.reason.clone();
    Ok(Json(FeatureResponse {
        feature: stored.into(),
        reason,
    }))
}

/// Response for the listing endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeatureListResponse {
    /// Stored records, newest first.
    pub features: Vec<FeatureRecord>,
}

/// GET /v1/features — list stored feature records, newest first.
#[utoipa::path(
    get,
    path = "/v1/features",
    responses(
        (status = 200, description = "Stored feature records", body = FeatureListResponse),
    ),
    tag = "features"
)]
async fn list_features(
    State(state): State<AppState>,
) -> Result<Json<FeatureListResponse>, AppError> {
    let features = state
        .features
        .list()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
        .into_iter()
        .map(FeatureRecord::from)
        .collect();
    Ok(Json(FeatureListResponse { features }))
}

/// Outcome of one batch row.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchRowResult {
    /// 1-based data row number (header row excluded).
    pub row: usize,
    /// The feature title from the row, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// The stored record, on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureRecord>,
    /// The failure message, on error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response for the batch endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatchResponse {
    /// Per-row outcomes, in input order.
    pub results: Vec<BatchRowResult>,
}

/// One CSV row of the import format.
#[derive(Debug, Deserialize)]
struct BatchRow {
    feature_name: Option<String>,
    feature_description: Option<String>,
}

/// POST /v1/features/batch — evaluate one feature per CSV row.
///
/// Expects a text body with `feature_name` and `feature_description`
/// columns. Rows run sequentially; each row's failure is recorded in its
/// result entry and the import continues.
#[utoipa::path(
    post,
    path = "/v1/features/batch",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Per-row evaluation results", body = BatchResponse),
        (status = 400, description = "Empty or unparseable CSV payload", body = crate::error::ErrorBody),
    ),
    tag = "features"
)]
async fn evaluate_batch(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<BatchResponse>, AppError> {
    if body.trim().is_empty() {
        return Err(AppError::BadRequest("No CSV data provided".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut results = Vec::new();
    for (i, record) in reader.deserialize::<BatchRow>().enumerate() {
        let row_number = i + 1;
        let row = match record {
            Ok(row) => row,
            Err(e) => {
                results.push(BatchRowResult {
                    row: row_number,
                    title: None,
                    feature: None,
                    error: Some(format!("unparseable row: {e}")),
                });
                continue;
            }
        };

        let (title, description) = match (row.feature_name, row.feature_description) {
            (Some(t), Some(d)) if !t.is_empty() && !d.is_empty() => (t, d),
            (t, _) => {
                results.push(BatchRowResult {
                    row: row_number,
                    title: t,
                    feature: None,
                    error: Some("Missing title or description".to_string()),
                });
                continue;
            }
        };

        let outcome = evaluate_row(&state, &title, &description).await;
        results.push(match outcome {
            Ok(stored) => BatchRowResult {
                row: row_number,
                title: Some(title),
                feature: Some(stored.into()),
                error: None,
            },
            Err(e) => {
                tracing::warn!(row = row_number, error = %e, "batch row failed");
                BatchRowResult {
                    row: row_number,
                    title: Some(title),
                    feature: None,
                    error: Some(e.to_string()),
                }
            }
        });
    }

    Ok(Json(BatchResponse { results }))
}

async fn evaluate_row(
    state: &AppState,
    title: &str,
    description: &str,
) -> Result<StoredFeature, AppError> {
    let submission = FeatureSubmission::new(title, description)?;
    Ok(state.evaluator.evaluate(&submission).await?)
}
