//! Operator notifications
//!
//! Delivery is best-effort: notifiers report success as a boolean and never
//! return errors to their caller. The dispatcher runs each delivery on its
//! own task so the caller-facing response never waits for it.

pub mod disabled;
pub mod dispatcher;
pub mod sms;

pub use disabled::DisabledNotifier;
pub use dispatcher::{DispatchHandle, NotificationDispatcher};
pub use sms::{SmsConfig, SmsNotifier};

use std::sync::Arc;

use call_filter_config::{NotifierConfig, TelephonyConfig};
use call_filter_core::Notifier;
use thiserror::Error;

/// Notification delivery errors
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Carrier rejected message: HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout")]
    Timeout,

    #[error("Not configured: {0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NotifyError::Timeout
        } else {
            NotifyError::Network(err.to_string())
        }
    }
}

impl From<NotifyError> for call_filter_core::Error {
    fn from(err: NotifyError) -> Self {
        call_filter_core::Error::NotificationFailed(err.to_string())
    }
}

/// Build the notifier described by configuration
///
/// Falls back to a `DisabledNotifier` when notifications are switched off or
/// the carrier account is incomplete, so calls are still routed normally.
pub fn build_notifier(telephony: &TelephonyConfig, config: &NotifierConfig) -> Arc<dyn Notifier> {
    if !config.enabled {
        return Arc::new(DisabledNotifier::new("disabled by configuration"));
    }

    match SmsConfig::from_settings(telephony, config).and_then(SmsNotifier::new) {
        Ok(notifier) => Arc::new(notifier),
        Err(e) => {
            tracing::warn!(error = %e, "SMS notifications unavailable");
            Arc::new(DisabledNotifier::new(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_without_credentials_is_disabled() {
        let notifier = build_notifier(&TelephonyConfig::default(), &NotifierConfig::default());
        assert_eq!(notifier.channel(), "disabled");
    }

    #[test]
    fn test_build_with_full_account() {
        let telephony = TelephonyConfig {
            account_sid: Some("AC123".to_string()),
            auth_token: Some("secret".to_string()),
            phone_number: Some("+33100000000".to_string()),
            notify_number: Some("+33600000000".to_string()),
            ..Default::default()
        };
        let notifier = build_notifier(&telephony, &NotifierConfig::default());
        assert_eq!(notifier.channel(), "sms");

        let config = NotifierConfig {
            enabled: false,
            ..Default::default()
        };
        assert_eq!(build_notifier(&telephony, &config).channel(), "disabled");
    }
}
