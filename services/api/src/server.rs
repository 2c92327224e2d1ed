use crate::cli::ServeArgs;
use crate::infra::{load_fixture, replay_service, AppState};
use crate::routes::with_enrichment_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lead_enrich::config::AppConfig;
use lead_enrich::error::AppError;
use lead_enrich::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let fixture = load_fixture(args.fixtures.as_deref())?;
    info!(
        fixtures = ?args.fixtures,
        pages = fixture.pages.len(),
        "replay backend loaded"
    );
    let service = Arc::new(replay_service(fixture, config.enrichment.clone()));

    let app = with_enrichment_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lead enrichment service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
