//! Operator notification configuration and message templates

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::notifier as defaults;

/// Notifier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Send operator messages at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Deadline for one delivery attempt
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum in-flight deliveries
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    #[serde(default)]
    pub templates: NotificationTemplates,
}

fn default_true() -> bool {
    true
}
fn default_timeout_ms() -> u64 {
    defaults::DEFAULT_TIMEOUT_MS
}
fn default_max_concurrent() -> usize {
    defaults::DEFAULT_MAX_CONCURRENT
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_ms: default_timeout_ms(),
            max_concurrent: default_max_concurrent(),
            templates: NotificationTemplates::default(),
        }
    }
}

impl NotifierConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Operator message templates
///
/// Placeholders: `{caller}`, `{transcript}`, `{recording}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationTemplates {
    pub urgent_transfer: String,
    pub urgent_transfer_after_clarification: String,
    pub voicemail: String,
    pub voicemail_after_clarification: String,
    pub voicemail_low_confidence: String,
    pub voicemail_unexpected_stage: String,
    /// Urgent call sent to voicemail because no forward number is configured
    pub voicemail_no_forward: String,
    pub voicemail_saved: String,
}

impl Default for NotificationTemplates {
    fn default() -> Self {
        Self {
            urgent_transfer: "Appel urgent de {caller}. Transcript: {transcript}".to_string(),
            urgent_transfer_after_clarification:
                "Appel urgent (après clarification) de {caller}. Transcript: {transcript}"
                    .to_string(),
            voicemail: "Message non-urgent de {caller}. Transcript: {transcript}".to_string(),
            voicemail_after_clarification:
                "Message non-urgent (après clarification) de {caller}. Transcript: {transcript}"
                    .to_string(),
            voicemail_low_confidence:
                "Urgence incertaine, messagerie pour {caller}. Transcript: {transcript}"
                    .to_string(),
            voicemail_unexpected_stage:
                "Appel de {caller} dirigé vers la messagerie après une erreur.".to_string(),
            voicemail_no_forward:
                "Appel urgent de {caller} non transféré (aucun numéro de renvoi), messagerie. Transcript: {transcript}"
                    .to_string(),
            voicemail_saved: "Nouveau message vocal de {caller}. Écouter: {recording}".to_string(),
        }
    }
}

impl NotificationTemplates {
    /// Substitute placeholders in `template`
    ///
    /// Single left-to-right pass: substituted values are never rescanned, so
    /// caller speech containing a placeholder name is kept literally.
    pub fn render(template: &str, caller: &str, transcript: &str, recording: &str) -> String {
        let values = [
            ("{caller}", caller),
            ("{transcript}", transcript),
            ("{recording}", recording),
        ];
        let mut out = String::with_capacity(template.len() + caller.len() + transcript.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            out.push_str(&rest[..start]);
            let tail = &rest[start..];
            match values.iter().find(|(name, _)| tail.starts_with(name)) {
                Some((name, value)) => {
                    out.push_str(value);
                    rest = &tail[name.len()..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}
