//! Call Filter Server
//!
//! Carrier webhooks for call triage, a synchronous analysis endpoint, and
//! health and metrics endpoints.

pub mod analyze;
pub mod http;
pub mod metrics;
pub mod state;
pub mod twiml;
pub mod webhooks;

pub use http::create_router;
pub use metrics::init_metrics;
pub use state::AppState;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Configuration(_) | ServerError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message returned to the client
    fn public_message(&self) -> String {
        match self {
            ServerError::InvalidRequest(msg) => msg.clone(),
            ServerError::Configuration(_) | ServerError::Internal(_) => {
                "internal error".to_string()
            }
        }
    }
}

impl From<call_filter_core::Error> for ServerError {
    fn from(err: call_filter_core::Error) -> Self {
        match err {
            call_filter_core::Error::InvalidRequest(msg) => ServerError::InvalidRequest(msg),
            call_filter_core::Error::Configuration(msg) => ServerError::Configuration(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}

impl From<call_filter_llm::LlmError> for ServerError {
    fn from(err: call_filter_llm::LlmError) -> Self {
        ServerError::Configuration(err.to_string())
    }
}

impl From<ServerError> for StatusCode {
    fn from(err: ServerError) -> Self {
        err.status()
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (
            status,
            Json(serde_json::json!({ "error": self.public_message() })),
        )
            .into_response()
    }
}
