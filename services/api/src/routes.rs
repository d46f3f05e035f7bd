use crate::infra::{AppState, UploadedImage};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use survey_ai::error::AppError;
use survey_ai::workflows::assessment::{RecommendationReport, RiskLevelReport, SurveyProfile};
use survey_ai::workflows::intake::{SubmissionOutcome, SurveyInput};
use tracing::error;

const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub(crate) fn api_router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/survey", post(survey_endpoint))
        .route("/api/recom", post(recommendations_endpoint))
        .route("/api/risk", post(risk_factors_endpoint))
        .route("/api/risk-level", post(risk_level_endpoint))
        .fallback(not_found)
}

#[derive(Debug, Deserialize)]
struct SurveyRequest {
    #[serde(default)]
    text: Option<String>,
}

/// What the transport managed to pull out of the request body.
enum SurveyPayload {
    Empty,
    Text(String),
    Image(UploadedImage),
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "timestamp": Utc::now().to_rfc3339() }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn survey_endpoint(
    Extension(state): Extension<AppState>,
    request: Request,
) -> Response {
    let payload = match read_survey_payload(request).await {
        Ok(payload) => payload,
        Err(err) => return err.into_response(),
    };

    let (input, upload) = match payload {
        SurveyPayload::Empty => (None, None),
        SurveyPayload::Text(text) => (Some(SurveyInput::Text(text)), None),
        SurveyPayload::Image(upload) => (
            Some(SurveyInput::Image(upload.path().to_path_buf())),
            Some(upload),
        ),
    };

    let outcome = state.intake.process(input).await;

    if let Some(upload) = upload {
        upload.discard();
    }

    render_outcome(outcome)
}

async fn read_survey_payload(request: Request) -> Result<SurveyPayload, AppError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    if content_type.starts_with("multipart/form-data") {
        let Ok(mut multipart) = Multipart::from_request(request, &()).await else {
            return Ok(SurveyPayload::Empty);
        };

        let mut text = None;
        let mut image = None;
        while let Ok(Some(field)) = multipart.next_field().await {
            match field.name() {
                Some("text") => text = field.text().await.ok(),
                Some("image") => image = field.bytes().await.ok(),
                _ => {}
            }
        }

        if let Some(text) = text.filter(|value| !value.is_empty()) {
            return Ok(SurveyPayload::Text(text));
        }
        if let Some(bytes) = image {
            return Ok(SurveyPayload::Image(UploadedImage::from_bytes(&bytes)?));
        }
        return Ok(SurveyPayload::Empty);
    }

    let bytes = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES).await?;
    let text = serde_json::from_slice::<SurveyRequest>(&bytes)
        .ok()
        .and_then(|body| body.text)
        .filter(|value| !value.is_empty());

    Ok(text.map(SurveyPayload::Text).unwrap_or(SurveyPayload::Empty))
}

fn render_outcome(outcome: SubmissionOutcome) -> Response {
    match outcome {
        SubmissionOutcome::Validated(result) => Json(result).into_response(),
        SubmissionOutcome::Incomplete { reason } => {
            Json(json!({ "status": "incomplete_profile", "reason": reason })).into_response()
        }
        SubmissionOutcome::Rejected { message } => {
            Json(json!({ "status": "error", "message": message })).into_response()
        }
    }
}

pub(crate) async fn recommendations_endpoint(
    Extension(state): Extension<AppState>,
    payload: Option<Json<SurveyProfile>>,
) -> Json<RecommendationReport> {
    let profile = payload.map(|Json(profile)| profile).unwrap_or_default();
    Json(state.assessor.recommendations(&profile).await)
}

pub(crate) async fn risk_factors_endpoint(
    Extension(state): Extension<AppState>,
    payload: Option<Json<SurveyProfile>>,
) -> Response {
    let profile = payload.map(|Json(profile)| profile).unwrap_or_default();

    match state.assessor.risk_factors(&profile).await {
        Ok(report) => Json(report).into_response(),
        Err(err) => {
            error!(error = %err, "risk factor assessment failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": "Failed to parse model response" })),
            )
                .into_response()
        }
    }
}

pub(crate) async fn risk_level_endpoint(
    Extension(state): Extension<AppState>,
    payload: Option<Json<SurveyProfile>>,
) -> Json<RiskLevelReport> {
    let profile = payload.map(|Json(profile)| profile).unwrap_or_default();
    Json(state.assessor.risk_level(&profile).await)
}

pub(crate) async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "status": "error", "message": "Endpoint not found" })),
    )
}
