use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
///
/// Hard failures render as `{"error": ...}`; informational outcomes
/// (not found, duplicate) render as `{"message": ...}`.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Create hit an existing song id. Reported with 302 for compatibility
    /// with existing clients.
    #[error("{0}")]
    Duplicate(String),

    #[error("{message}: {cause}")]
    Internal {
        message: &'static str,
        cause: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Startup error: {0}")]
    Startup(String),

    #[error("Not found")]
    RouteNotFound,
}

impl ServerError {
    /// A store or repository failure, reported to the client as `message`.
    pub fn internal(message: &'static str, cause: impl std::fmt::Display) -> Self {
        ServerError::Internal {
            message,
            cause: cause.to_string(),
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::NotFound(_) | ServerError::RouteNotFound => StatusCode::NOT_FOUND,
            ServerError::Duplicate(_) => StatusCode::FOUND,
            ServerError::Internal { .. } | ServerError::Config(_) | ServerError::Startup(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// JSON body sent to the client
    pub fn body(&self) -> Value {
        match self {
            ServerError::NotFound(message) | ServerError::Duplicate(message) => {
                json!({ "message": message })
            }
            ServerError::BadRequest(message) => json!({ "error": message }),
            ServerError::Internal { message, .. } => json!({ "error": message }),
            ServerError::Config(_) | ServerError::Startup(_) => {
                json!({ "error": "Internal server error" })
            }
            ServerError::RouteNotFound => json!({ "error": "Not found" }),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(self.body())).into_response()
    }
}
