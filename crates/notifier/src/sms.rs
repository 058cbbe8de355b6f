//! SMS delivery through the carrier's messaging REST API

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use call_filter_config::{NotifierConfig, TelephonyConfig};
use call_filter_core::Notifier;

use crate::NotifyError;

/// Everything needed to send one SMS to the operator
#[derive(Debug, Clone)]
pub struct SmsConfig {
    pub api_base: String,
    pub account_sid: String,
    pub auth_token: String,
    /// Sending number
    pub from: String,
    /// Operator number
    pub to: String,
    pub timeout: Duration,
}

impl SmsConfig {
    pub fn from_settings(
        telephony: &TelephonyConfig,
        notifier: &NotifierConfig,
    ) -> Result<Self, NotifyError> {
        let (account_sid, auth_token) = telephony
            .credentials()
            .ok_or_else(|| NotifyError::NotConfigured("carrier credentials".to_string()))?;
        let from = telephony
            .phone_number()
            .ok_or_else(|| NotifyError::NotConfigured("telephony.phone_number".to_string()))?;
        let to = telephony
            .notify_number()
            .ok_or_else(|| NotifyError::NotConfigured("telephony.notify_number".to_string()))?;

        Ok(Self {
            api_base: telephony.api_base.clone(),
            account_sid: account_sid.to_string(),
            auth_token: auth_token.to_string(),
            from: from.to_string(),
            to: to.to_string(),
            timeout: notifier.timeout(),
        })
    }
}

/// Sends operator messages as SMS
pub struct SmsNotifier {
    config: SmsConfig,
    client: Client,
}

impl SmsNotifier {
    pub fn new(config: SmsConfig) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| NotifyError::NotConfigured(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }

    /// Send `body`, returning the carrier's message id when it reports one
    pub async fn send(&self, body: &str) -> Result<Option<String>, NotifyError> {
        let response = self
            .client
            .post(self.messages_url())
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", self.config.to.as_str()),
                ("From", self.config.from.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let created: Option<MessageCreated> = response.json().await.ok();
        Ok(created.and_then(|m| m.sid))
    }
}

#[async_trait]
impl Notifier for SmsNotifier {
    async fn notify(&self, message: &str) -> bool {
        match self.send(message).await {
            Ok(sid) => {
                tracing::info!(
                    to = %self.config.to,
                    sid = sid.as_deref().unwrap_or(""),
                    "SMS sent"
                );
                true
            }
            Err(e) => {
                tracing::error!(to = %self.config.to, error = %e, "SMS delivery failed");
                false
            }
        }
    }

    fn channel(&self) -> &str {
        "sms"
    }
}

#[derive(Debug, Deserialize)]
struct MessageCreated {
    sid: Option<String>,
}
