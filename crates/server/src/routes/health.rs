use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// Health check endpoint
///
/// Pings the store: `{"status": "OK"}` with 200 when it answers,
/// `{"status": "UNAVAILABLE"}` with 500 when it does not.
pub async fn health_check(State(state): State<Arc<ServerState>>) -> Response {
    match state.repository.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "OK" }))).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "UNAVAILABLE" })),
            )
                .into_response()
        }
    }
}

/// Prometheus metrics endpoint
pub async fn metrics(State(state): State<Arc<ServerState>>) -> ServerResult<impl IntoResponse> {
    let handle = state.metrics.as_ref().ok_or(ServerError::RouteNotFound)?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
