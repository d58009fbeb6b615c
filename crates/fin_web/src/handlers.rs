use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use fin_core::{EnrichmentModel, Operation};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use crate::AppState;

pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({ "status": "ok", "model": state.enricher.name() }))
}

pub async fn summarize(State(state): State<Arc<AppState>>, Json(payload): Json<Value>) -> Response {
    forward(&state, Operation::Summarize, &payload, "Failed to summarize content").await
}

pub async fn sentiment(State(state): State<Arc<AppState>>, Json(payload): Json<Value>) -> Response {
    forward(&state, Operation::Sentiment, &payload, "Failed to analyze sentiment").await
}

async fn forward(state: &AppState, operation: Operation, payload: &Value, failure: &str) -> Response {
    match state.enricher.forward(operation, payload).await {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            error!(%operation, error = %e, "Error forwarding manual request");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": failure }))).into_response()
        }
    }
}

/// Starts a pipeline cycle in the background unless one is already running.
pub async fn trigger_cycle(State(state): State<Arc<AppState>>) -> Response {
    let Some(scheduler) = state.scheduler.as_ref() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "Pipeline is not running in this process" })),
        )
            .into_response();
    };

    match scheduler.spawn_cycle() {
        Some(_) => {
            info!("Manual cycle started");
            (StatusCode::ACCEPTED, Json(json!({ "status": "started" }))).into_response()
        }
        None => (StatusCode::CONFLICT, Json(json!({ "status": "in_progress" }))).into_response(),
    }
}
