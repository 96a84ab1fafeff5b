//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "GeoLex API — Geo-Compliance Assistant",
        version = "0.3.2",
        description = "Retrieval-augmented compliance evaluation for product features.\n\nSubmit a feature (title + description) and GeoLex determines, per region (US federal, Utah, Florida, California, EU), whether it likely triggers region-specific legal obligations: the feature is validated, embedded, matched against per-jurisdiction legal corpora, adjudicated by an LLM, and the reconciled verdict is persisted.\n\nVerdicts are advisory — GeoLex guarantees a reproducible decision procedure, not legal correctness.",
        license(name = "AGPL-3.0-or-later")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server"),
    ),
    paths(
        crate::routes::features::evaluate_feature,
        crate::routes::features::list_features,
        crate::routes::features::evaluate_batch,
        crate::routes::corpus::ingest_corpus,
    ),
    components(schemas(
        crate::routes::features::FeatureRequest,
        crate::routes::features::FeatureRecord,
        crate::routes::features::FeatureResponse,
        crate::routes::features::FeatureListResponse,
        crate::routes::features::BatchRowResult,
        crate::routes::features::BatchResponse,
        crate::routes::corpus::IngestResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "features", description = "Feature evaluation and listing"),
        (name = "corpus", description = "Legal-corpus ingestion"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(serve_openapi))
}

/// GET /openapi.json — the generated spec.
async fn serve_openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_generates_and_contains_feature_paths() {
        let spec = ApiDoc::openapi();
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("/v1/features"));
        assert!(json.contains("/v1/features/batch"));
        assert!(json.contains("/v1/corpus/ingest"));
    }
}
