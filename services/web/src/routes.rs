use crate::form::PredictionForm;
use crate::infra::AppState;
use crate::views::{render, Outcome, UiState};
use attrition::error::AppError;
use attrition::prediction::{
    ArtifactLoader, AttritionPredictor, EmployeeRecord, Label, Prediction,
};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Serialize)]
pub(crate) struct PredictionResponse {
    pub(crate) label: Label,
    pub(crate) message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) leave_probability: Option<f64>,
    pub(crate) evaluated_at: DateTime<Utc>,
}

impl From<Prediction> for PredictionResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            label: prediction.label,
            message: prediction.label.message(),
            leave_probability: prediction.leave_probability,
            evaluated_at: Utc::now(),
        }
    }
}

/// Form pages plus the JSON prediction endpoint, sharing one artifact loader.
pub(crate) fn prediction_router(loader: Arc<ArtifactLoader>) -> Router {
    Router::new()
        .route("/", get(home_page))
        .route("/attrition", get(prediction_page).post(submit_prediction_form))
        .route("/api/v1/attrition/predict", post(predict_endpoint))
        .with_state(loader)
}

pub(crate) fn with_operational_routes(router: Router) -> Router {
    router
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn home_page() -> Html<String> {
    Html(render(&UiState::home()))
}

pub(crate) async fn prediction_page(State(loader): State<Arc<ArtifactLoader>>) -> Html<String> {
    let state = match loader.load() {
        Ok(_) => UiState::prediction(PredictionForm::default(), None),
        Err(err) => UiState::unavailable(err.to_string()),
    };
    Html(render(&state))
}

pub(crate) async fn submit_prediction_form(
    State(loader): State<Arc<ArtifactLoader>>,
    Form(form): Form<PredictionForm>,
) -> Html<String> {
    let artifacts = match loader.load() {
        Ok(artifacts) => artifacts,
        Err(err) => return Html(render(&UiState::unavailable(err.to_string()))),
    };

    let outcome = form
        .to_record()
        .map_err(|err| err.to_string())
        .and_then(|record| {
            AttritionPredictor::new(artifacts)
                .predict(&record)
                .map_err(|err| err.to_string())
        });

    let outcome = match outcome {
        Ok(prediction) => {
            info!(label = %prediction.label, "form prediction served");
            Outcome::Verdict(prediction)
        }
        Err(message) => {
            warn!(%message, "form prediction rejected");
            Outcome::Failed(message)
        }
    };

    Html(render(&UiState::prediction(form, Some(outcome))))
}

pub(crate) async fn predict_endpoint(
    State(loader): State<Arc<ArtifactLoader>>,
    payload: Result<Json<EmployeeRecord>, JsonRejection>,
) -> Result<Json<PredictionResponse>, AppError> {
    let Json(record) = payload?;
    record.validate()?;
    let artifacts = loader.load()?;
    let prediction = AttritionPredictor::new(artifacts).predict(&record)?;
    info!(label = %prediction.label, "api prediction served");
    Ok(Json(prediction.into()))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else if !state.artifacts.is_loaded() {
        json!({ "status": "artifacts_unavailable" })
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
