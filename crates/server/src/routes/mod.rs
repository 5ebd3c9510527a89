//! API route handlers
//!
//! - `health`: store liveness and Prometheus metrics
//! - `songs`: song CRUD and collection count

pub mod health;
pub mod songs;

use crate::error::{ServerError, ServerResult};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// API version and base info
///
/// # Response
///
/// ```json
/// {
///   "name": "Songbook Server",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(json!({
        "name": "Songbook Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /health",
            "GET /count",
            "GET /song",
            "POST /song",
            "GET /song/{id}",
            "PUT /song/{id}",
            "DELETE /song/{id}",
            "GET /metrics"
        ]
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::RouteNotFound
}
