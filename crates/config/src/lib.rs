//! Configuration management for the call filter
//!
//! Supports loading configuration from:
//! - YAML/TOML files (`config/default`, `config/{env}`)
//! - Environment variables (CALL_FILTER__ prefix, `__` separator)
//! - Serde defaults
//!
//! Every component receives its section of `Settings` at construction time;
//! nothing reads configuration from ambient global state afterwards.

pub mod classifier;
pub mod constants;
pub mod notifier;
pub mod settings;
pub mod telephony;
pub mod triage;

pub use classifier::ClassifierConfig;
pub use notifier::{NotificationTemplates, NotifierConfig};
pub use settings::{
    load_settings, load_settings_from, ObservabilityConfig, RuntimeEnvironment, ServerConfig,
    Settings,
};
pub use telephony::TelephonyConfig;
pub use triage::{CallerPrompts, TriageConfig};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl ConfigError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
