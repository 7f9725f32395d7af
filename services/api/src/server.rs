use crate::cli::ServeArgs;
use crate::infra::{load_scoring_key, AppState, ConfiguredSender};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use lionheart::config::AppConfig;
use lionheart::error::AppError;
use lionheart::results::{ResultsLinkBuilder, ResultsService};
use lionheart::telemetry;
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

    let key = load_scoring_key(&config.scoring)?;
    let sender = Arc::new(ConfiguredSender::from_config(&config.notifications));
    let links = ResultsLinkBuilder::new(config.scoring.results_base_url.clone());
    let service = Arc::new(ResultsService::new(key, sender, links));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_service_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lionheart scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
