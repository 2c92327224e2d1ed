use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;

use super::domain::JobPayload;
use super::service::{EnrichOptions, LeadEnrichmentService};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct EnrichQuery {
    /// Skips the paid phone providers for this request.
    #[serde(default)]
    test_mode: Option<bool>,
}

/// Router builder exposing lead enrichment and provider statistics.
pub fn enrichment_router(service: Arc<LeadEnrichmentService>) -> Router {
    Router::new()
        .route("/api/v1/leads/enrich", post(enrich_handler))
        .route("/api/v1/stats", get(stats_handler))
        .route("/api/v1/stats/summary", get(stats_summary_handler))
        .route("/api/v1/stats/reset", post(stats_reset_handler))
        .with_state(service)
}

pub(crate) async fn enrich_handler(
    State(service): State<Arc<LeadEnrichmentService>>,
    Query(query): Query<EnrichQuery>,
    axum::Json(payload): axum::Json<JobPayload>,
) -> Response {
    if payload.company.trim().is_empty() {
        return AppError::InvalidLead("company must not be blank".to_string()).into_response();
    }

    let options = EnrichOptions {
        skip_paid_providers: query
            .test_mode
            .unwrap_or(service.config().skip_paid_providers),
    };
    let result = service.enrich_with_options(&payload, options).await;
    (StatusCode::OK, axum::Json(result)).into_response()
}

pub(crate) async fn stats_handler(State(service): State<Arc<LeadEnrichmentService>>) -> Response {
    (StatusCode::OK, axum::Json(service.stats().snapshot())).into_response()
}

pub(crate) async fn stats_summary_handler(
    State(service): State<Arc<LeadEnrichmentService>>,
) -> Response {
    (StatusCode::OK, service.stats().summary()).into_response()
}

pub(crate) async fn stats_reset_handler(
    State(service): State<Arc<LeadEnrichmentService>>,
) -> Response {
    service.stats().reset();
    let body = json!({
        "status": "reset",
    });
    (StatusCode::OK, axum::Json(body)).into_response()
}
