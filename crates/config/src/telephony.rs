//! Carrier account and phone numbers

use serde::{Deserialize, Serialize};

use crate::constants::telephony as defaults;

/// Telephony carrier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelephonyConfig {
    /// Carrier REST API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Account identifier
    #[serde(default)]
    pub account_sid: Option<String>,

    /// Account auth token (set via CALL_FILTER__TELEPHONY__AUTH_TOKEN)
    #[serde(default)]
    pub auth_token: Option<String>,

    /// Number that operator messages are sent from
    #[serde(default)]
    pub phone_number: Option<String>,

    /// Operator number that urgent calls are bridged to
    #[serde(default)]
    pub forward_number: Option<String>,

    /// Operator number that receives status messages
    #[serde(default)]
    pub notify_number: Option<String>,
}

fn default_api_base() -> String {
    defaults::DEFAULT_API_BASE.to_string()
}

impl Default for TelephonyConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            account_sid: None,
            auth_token: None,
            phone_number: None,
            forward_number: None,
            notify_number: None,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl TelephonyConfig {
    pub fn forward_number(&self) -> Option<&str> {
        non_blank(&self.forward_number)
    }

    pub fn notify_number(&self) -> Option<&str> {
        non_blank(&self.notify_number)
    }

    pub fn phone_number(&self) -> Option<&str> {
        non_blank(&self.phone_number)
    }

    /// Account credentials, when both halves are present
    pub fn credentials(&self) -> Option<(&str, &str)> {
        Some((non_blank(&self.account_sid)?, non_blank(&self.auth_token)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_both_parts() {
        let mut config = TelephonyConfig::default();
        assert!(config.credentials().is_none());

        config.account_sid = Some("AC123".to_string());
        assert!(config.credentials().is_none());

        config.auth_token = Some("secret".to_string());
        assert_eq!(config.credentials(), Some(("AC123", "secret")));
    }

    #[test]
    fn test_blank_numbers_are_unset() {
        let config = TelephonyConfig {
            forward_number: Some(" ".to_string()),
            notify_number: Some("+33612345678".to_string()),
            ..Default::default()
        };
        assert!(config.forward_number().is_none());
        assert_eq!(config.notify_number(), Some("+33612345678"));
    }
}
