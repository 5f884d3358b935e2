use crate::cli::ServeArgs;
use crate::infra::{load_source, AppState};
use crate::routes::with_report_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use strata_analytics::config::AppConfig;
use strata_analytics::error::AppError;
use strata_analytics::telemetry;
use strata_analytics::ReportService;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(data) = args.data.take() {
        config.analytics.data_path = Some(data);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let source = load_source(config.analytics.data_path.as_deref())?;
    let report_service = Arc::new(ReportService::with_deadline(
        Arc::new(source),
        config.analytics.fetch_timeout,
    ));

    let app = with_report_routes(report_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        fetch_timeout_ms = config.analytics.fetch_timeout.as_millis() as u64,
        "strata analytics service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
