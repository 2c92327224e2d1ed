use crate::replay::{ReplayBackend, ReplayFixture};
use lead_enrich::config::EnrichmentConfig;
use lead_enrich::error::AppError;
use lead_enrich::workflows::enrichment::{JobPayload, LeadEnrichmentService};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Bundled sample lead used by `demo` and as the default `serve` backend.
pub(crate) const SAMPLE_FIXTURE: &str = include_str!("../fixtures/sample_lead.json");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn load_fixture(path: Option<&Path>) -> Result<ReplayFixture, AppError> {
    let fixture = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)?;
            serde_json::from_str(&raw)?
        }
        None => serde_json::from_str(SAMPLE_FIXTURE)?,
    };
    Ok(fixture)
}

pub(crate) fn read_payload(path: &Path) -> Result<JobPayload, AppError> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub(crate) fn replay_service(
    fixture: ReplayFixture,
    config: EnrichmentConfig,
) -> LeadEnrichmentService {
    LeadEnrichmentService::new(ReplayBackend::new(fixture).into_collaborators(), config)
}
