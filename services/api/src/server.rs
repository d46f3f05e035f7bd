use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use survey_ai::clients::{GeminiClient, OcrSpaceClient};
use survey_ai::config::AppConfig;
use survey_ai::error::AppError;
use survey_ai::telemetry;
use survey_ai::workflows::assessment::RiskAssessor;
use survey_ai::workflows::intake::SurveyIntake;
use tracing::info;

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness = Arc::new(AtomicBool::new(false));

    let ocr = OcrSpaceClient::new(&config.upstream)?;
    let model = GeminiClient::new(&config.upstream)?;

    let state = AppState {
        readiness: Arc::clone(&readiness),
        metrics: Arc::new(prometheus_handle),
        intake: Arc::new(SurveyIntake::new(Box::new(ocr))),
        assessor: Arc::new(RiskAssessor::new(Box::new(model))),
    };

    let app = routes::api_router()
        .layer(Extension(state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Flip to ready only once the socket is actually bound.
    readiness.store(true, Ordering::Release);
    info!(
        environment = ?config.environment,
        address = %addr,
        model = %config.upstream.llm_model,
        "health survey service listening"
    );

    axum::serve(listener, app).await?;

    Ok(())
}
