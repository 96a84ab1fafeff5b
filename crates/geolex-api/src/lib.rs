//! # geolex-api — Axum API Services for GeoLex
//!
//! The HTTP layer over the compliance evaluation pipeline. Users submit a
//! product feature and receive a per-region verdict map; results are
//! persisted for the map/table UI to read back.
//!
//! ## API Surface
//!
//! | Route                    | Module                | Purpose                      |
//! |--------------------------|-----------------------|------------------------------|
//! | `POST /v1/features`      | [`routes::features`]  | Evaluate and store a feature |
//! | `GET /v1/features`       | [`routes::features`]  | List stored records          |
//! | `POST /v1/features/batch`| [`routes::features`]  | CSV import, one run per row  |
//! | `POST /v1/corpus/ingest` | [`routes::corpus`]    | Seed the knowledge bases     |
//! | `GET /openapi.json`      | [`openapi`]           | Generated OpenAPI spec       |
//! | `GET /health/*`          | here                  | Liveness/readiness probes    |
//! | `GET /metrics`           | here                  | Prometheus scrape endpoint   |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! ## Crate Policy
//!
//! - No business logic in route handlers — evaluation semantics live in
//!   `geolex-pipeline`, clients in `geolex-rag`.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod db;
pub mod error;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::middleware::from_fn;
use axum::response::IntoResponse;
use axum::{Extension, Router};
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use state::{AppConfig, AppState};

use crate::middleware::metrics::ApiMetrics;
use crate::state::metrics_enabled;

/// Assemble the full application router with all routes and middleware.
///
/// Health probes (`/health/*`) and `/metrics` are mounted outside the API
/// middleware so they stay reachable when the evaluation path degrades.
pub fn app(state: AppState) -> Router {
    let metrics = ApiMetrics::new();
    let metrics_on = metrics_enabled();

    // Body size limit: 2 MiB covers the largest expected CSV imports while
    // bounding memory per request.
    let mut api = Router::new()
        .merge(routes::features::router())
        .merge(routes::corpus::router())
        .merge(openapi::router())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    if metrics_on {
        api = api
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics.clone()));
    }

    let api = api
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    let mut unauthenticated = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    if metrics_on {
        unauthenticated = unauthenticated
            .route("/metrics", axum::routing::get(prometheus_metrics))
            .layer(Extension(metrics));
    }

    let unauthenticated = unauthenticated.with_state(state);

    Router::new().merge(unauthenticated).merge(api)
}

/// GET /metrics — Prometheus metrics scrape endpoint.
///
/// Updates the stored-features gauge from the feature store on each scrape
/// (pull model), then gathers and encodes all metrics in Prometheus text
/// exposition format.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    match state.features.list().await {
        Ok(features) => metrics.features_total().set(features.len() as f64),
        Err(e) => tracing::warn!(error = %e, "feature store unavailable during metrics scrape"),
    }

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(
                axum::http::header::CONTENT_TYPE,
                "text/plain; version=0.0.4; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}

/// Liveness probe — always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe — verifies the application is ready to serve traffic.
///
/// Checks:
/// - The feature store answers a list query.
/// - The database connection is healthy (when configured).
///
/// The model and document store are NOT probed here: the pipeline degrades
/// per-request, and a slow model must not flap the whole deployment.
///
/// Returns 200 "ready" or 503 with a diagnostic message.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if let Err(e) = state.features.list().await {
        tracing::warn!(error = %e, "feature store health check failed");
        return (StatusCode::SERVICE_UNAVAILABLE, "feature store unreachable").into_response();
    }

    if let Some(pool) = &state.db_pool {
        if let Err(e) = sqlx::query("SELECT 1").execute(pool).await {
            tracing::warn!("Database health check failed: {e}");
            return (StatusCode::SERVICE_UNAVAILABLE, "database unreachable").into_response();
        }
    }

    (StatusCode::OK, "ready").into_response()
}
