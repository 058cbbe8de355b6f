//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::constants::server as server_defaults;
use crate::{ClassifierConfig, ConfigError, NotifierConfig, TelephonyConfig, TriageConfig};

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode
    Staging,
    /// Production mode - carrier and classifier credentials required
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub classifier: ClassifierConfig,

    #[serde(default)]
    pub triage: TriageConfig,

    #[serde(default)]
    pub telephony: TelephonyConfig,

    #[serde(default)]
    pub notifier: NotifierConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_classifier()?;
        self.validate_triage()?;
        self.validate_notifier()?;
        self.validate_server()?;

        if self.environment.is_production() {
            self.validate_production()?;
        }

        Ok(())
    }

    fn validate_classifier(&self) -> Result<(), ConfigError> {
        let classifier = &self.classifier;

        if !(0.0..=2.0).contains(&classifier.temperature) {
            return Err(ConfigError::invalid(
                "classifier.temperature",
                "Temperature must be between 0.0 and 2.0",
            ));
        }

        if classifier.timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "classifier.timeout_ms",
                "Timeout must be greater than zero",
            ));
        }

        if classifier.max_concurrent_requests == 0 {
            return Err(ConfigError::invalid(
                "classifier.max_concurrent_requests",
                "At least one concurrent request is required",
            ));
        }

        if classifier.urgency_keywords.is_empty() {
            return Err(ConfigError::invalid(
                "classifier.urgency_keywords",
                "Keyword list must not be empty",
            ));
        }

        if let Some(keyword) = classifier
            .urgency_keywords
            .iter()
            .find(|k| k.trim().is_empty() || **k != k.to_lowercase())
        {
            return Err(ConfigError::invalid(
                "classifier.urgency_keywords",
                format!("Keyword '{}' must be non-empty and lowercase", keyword),
            ));
        }

        Ok(())
    }

    fn validate_triage(&self) -> Result<(), ConfigError> {
        let threshold = self.triage.urgent_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::invalid(
                "triage.urgent_threshold",
                "Threshold must be between 0.0 and 1.0",
            ));
        }

        if self.triage.voicemail_max_length_secs == 0 {
            return Err(ConfigError::invalid(
                "triage.voicemail_max_length_secs",
                "Voicemail length must be greater than zero",
            ));
        }

        Ok(())
    }

    fn validate_notifier(&self) -> Result<(), ConfigError> {
        if self.notifier.timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "notifier.timeout_ms",
                "Timeout must be greater than zero",
            ));
        }

        if self.notifier.max_concurrent == 0 {
            return Err(ConfigError::invalid(
                "notifier.max_concurrent",
                "At least one concurrent delivery is required",
            ));
        }

        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::invalid("server.port", "Port must be non-zero"));
        }

        if self.server.timeout_seconds == 0 {
            return Err(ConfigError::invalid(
                "server.timeout_seconds",
                "Timeout must be greater than zero",
            ));
        }

        Ok(())
    }

    fn validate_production(&self) -> Result<(), ConfigError> {
        if self.telephony.forward_number().is_none() {
            return Err(ConfigError::MissingField(
                "telephony.forward_number".to_string(),
            ));
        }

        if self.classifier.api_key().is_none() {
            return Err(ConfigError::MissingField("classifier.api_key".to_string()));
        }

        if self.notifier.enabled && self.telephony.credentials().is_none() {
            tracing::warn!("Notifier enabled without carrier credentials; messages will be skipped");
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Public base URL prefixed to carrier callback actions
    ///
    /// Relative callback paths are emitted when unset.
    #[serde(default)]
    pub public_base_url: Option<String>,
}

fn default_host() -> String {
    server_defaults::DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    server_defaults::DEFAULT_PORT
}
fn default_timeout() -> u64 {
    server_defaults::DEFAULT_TIMEOUT_SECS
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            public_base_url: None,
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Absolute or relative callback URL for `path`
    pub fn callback_url(&self, path: &str) -> String {
        match self
            .public_base_url
            .as_deref()
            .map(|base| base.trim().trim_end_matches('/'))
            .filter(|base| !base.is_empty())
        {
            Some(base) => format!("{}{}", base, path),
            None => path.to_string(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable tracing export (telemetry feature only)
    #[serde(default = "default_true")]
    pub tracing_enabled: bool,

    /// OTLP endpoint for traces
    #[serde(default)]
    pub otlp_endpoint: Option<String>,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            tracing_enabled: true,
            otlp_endpoint: None,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (CALL_FILTER__ prefix)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Load settings with configuration files looked up in `dir`
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    let default_path = dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    if let Some(env_name) = env {
        let env_path = dir.join(env_name);
        builder = builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("CALL_FILTER")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
