//! Error types shared across the call filter crates

use thiserror::Error;

/// Call filter errors
///
/// Only `InvalidRequest` and `Configuration` ever reach an HTTP client.
/// The other variants are recovered where they occur and exist so the
/// recovery path can be logged and counted by category.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// External classifier unreachable, timed out, or replied with garbage
    #[error("Classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// Side-channel delivery failed
    #[error("Notification failed: {0}")]
    NotificationFailed(String),

    /// Missing or malformed field on an inbound request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// An event arrived for a stage the state machine does not handle
    #[error("Unexpected stage: {0}")]
    UnexpectedStage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Short category name, used as a metrics label
    pub fn category(&self) -> &'static str {
        match self {
            Error::ClassifierUnavailable(_) => "classifier_unavailable",
            Error::NotificationFailed(_) => "notification_failed",
            Error::InvalidRequest(_) => "invalid_request",
            Error::UnexpectedStage(_) => "unexpected_stage",
            Error::Configuration(_) => "configuration",
        }
    }
}
