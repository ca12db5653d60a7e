use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::{prediction_router, with_operational_routes};
use attrition::config::AppConfig;
use attrition::error::AppError;
use attrition::prediction::ArtifactLoader;
use attrition::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{error, info};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    args.artifacts.apply(&mut config.artifacts);
    config.artifacts.validate()?;

    telemetry::init(&config.telemetry)?;

    let loader = Arc::new(ArtifactLoader::new(config.artifacts.clone()));
    if let Err(err) = loader.load() {
        error!(
            error = %err,
            "predictions disabled until the artifacts can be loaded"
        );
    }

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        artifacts: loader.clone(),
    };

    let app = with_operational_routes(prediction_router(loader))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        model = %config.artifacts.model_path.display(),
        "attrition insight service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
