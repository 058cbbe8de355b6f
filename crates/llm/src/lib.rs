//! Urgency classification over a chat-completion model
//!
//! Features:
//! - OpenAI-compatible chat backend (non-streaming, deterministic decoding)
//! - French classification prompt and lenient JSON reply parsing
//! - Keyword fallback whenever the model cannot be used
//! - Bounded in-flight requests with a single per-call deadline

pub mod backend;
pub mod classifier;
pub mod fallback;
pub mod prompt;

pub use backend::{FinishReason, GenerationResult, LlmBackend, OpenAIBackend, OpenAIConfig};
pub use classifier::{parse_reply, LlmUrgencyClassifier};
pub use fallback::KeywordFallback;
pub use prompt::{ClassificationPrompt, Message, Role};

use call_filter_core::FallbackCause;
use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("No request slot available before the deadline")]
    Saturated,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl LlmError {
    /// Fallback cause reported alongside the heuristic verdict
    pub fn fallback_cause(&self) -> FallbackCause {
        match self {
            LlmError::Api { status, .. } => FallbackCause::HttpStatus(*status),
            LlmError::Network(_) | LlmError::Configuration(_) => FallbackCause::Transport,
            LlmError::InvalidResponse(_) => FallbackCause::MalformedReply,
            LlmError::Timeout => FallbackCause::Timeout,
            LlmError::Saturated => FallbackCause::Saturated,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::InvalidResponse(err.to_string())
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for call_filter_core::Error {
    fn from(err: LlmError) -> Self {
        call_filter_core::Error::ClassifierUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_causes() {
        let err = LlmError::Api {
            status: 503,
            body: String::new(),
        };
        assert_eq!(err.fallback_cause(), FallbackCause::HttpStatus(503));
        assert_eq!(LlmError::Timeout.fallback_cause(), FallbackCause::Timeout);
        assert_eq!(
            LlmError::InvalidResponse("x".into()).fallback_cause(),
            FallbackCause::MalformedReply
        );
    }

    #[test]
    fn test_into_core_error() {
        let err: call_filter_core::Error = LlmError::Timeout.into();
        assert_eq!(err.category(), "classifier_unavailable");
    }
}
