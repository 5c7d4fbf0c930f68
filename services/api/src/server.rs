use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredAuditSink};
use crate::routes::with_engine_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use talent_audit::config::AppConfig;
use talent_audit::engine::TalentAuditService;
use talent_audit::error::AppError;
use talent_audit::telemetry;
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

    let sink = Arc::new(ConfiguredAuditSink::from_config(&config.audit));
    let audit_sink = sink.describe();
    let service = Arc::new(TalentAuditService::new(
        sink,
        config.engine.clone(),
        config.audit.default_actor.clone(),
    ));

    let app = with_engine_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        audit_sink = %audit_sink,
        match_mode = config.engine.ranking.match_mode.label(),
        "talent audit service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
