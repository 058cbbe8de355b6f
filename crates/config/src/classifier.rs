//! External classifier configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::classifier as defaults;

/// Classifier client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// OpenAI-compatible API base (chat completions live under it)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key (set via CALL_FILTER__CLASSIFIER__API_KEY)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model name/ID
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Decoding temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Deadline for one classification, including waiting for a slot
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum in-flight classification requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,

    /// Lowercase keywords for the fallback heuristic, first match wins
    #[serde(default = "default_keywords")]
    pub urgency_keywords: Vec<String>,
}

fn default_endpoint() -> String {
    defaults::DEFAULT_ENDPOINT.to_string()
}
fn default_model() -> String {
    defaults::DEFAULT_MODEL.to_string()
}
fn default_max_tokens() -> usize {
    defaults::DEFAULT_MAX_TOKENS
}
fn default_temperature() -> f32 {
    defaults::DEFAULT_TEMPERATURE
}
fn default_timeout_ms() -> u64 {
    defaults::DEFAULT_TIMEOUT_MS
}
fn default_max_concurrent() -> usize {
    defaults::DEFAULT_MAX_CONCURRENT
}
fn default_keywords() -> Vec<String> {
    defaults::DEFAULT_URGENCY_KEYWORDS
        .iter()
        .map(|k| k.to_string())
        .collect()
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_ms: default_timeout_ms(),
            max_concurrent_requests: default_max_concurrent(),
            urgency_keywords: default_keywords(),
        }
    }
}

impl ClassifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// API key with blank values treated as unset
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert_eq!(config.urgency_keywords.len(), 7);
        assert_eq!(config.urgency_keywords[2], "incendie");
    }

    #[test]
    fn test_blank_api_key_is_unset() {
        let mut config = ClassifierConfig::default();
        config.api_key = Some("  ".to_string());
        assert!(config.api_key().is_none());
        config.api_key = Some("sk-test".to_string());
        assert_eq!(config.api_key(), Some("sk-test"));
    }
}
