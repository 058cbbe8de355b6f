//! Triage configuration: decision threshold and caller-facing prompts

use serde::{Deserialize, Serialize};

use crate::constants::triage as defaults;

/// Triage state machine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageConfig {
    /// First-pass urgent verdicts below this confidence go to voicemail
    #[serde(default = "default_urgent_threshold")]
    pub urgent_threshold: f32,

    /// Text-to-speech voice used by the carrier
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Spoken language tag
    #[serde(default = "default_language")]
    pub language: String,

    /// Maximum voicemail length in seconds
    #[serde(default = "default_voicemail_max_length")]
    pub voicemail_max_length_secs: u32,

    /// Play a beep before recording
    #[serde(default = "default_true")]
    pub play_beep: bool,

    #[serde(default)]
    pub prompts: CallerPrompts,
}

fn default_urgent_threshold() -> f32 {
    defaults::DEFAULT_URGENT_THRESHOLD
}
fn default_voice() -> String {
    defaults::DEFAULT_VOICE.to_string()
}
fn default_language() -> String {
    defaults::DEFAULT_LANGUAGE.to_string()
}
fn default_voicemail_max_length() -> u32 {
    defaults::DEFAULT_VOICEMAIL_MAX_LENGTH_SECS
}
fn default_true() -> bool {
    true
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            urgent_threshold: default_urgent_threshold(),
            voice: default_voice(),
            language: default_language(),
            voicemail_max_length_secs: default_voicemail_max_length(),
            play_beep: true,
            prompts: CallerPrompts::default(),
        }
    }
}

/// Caller-facing prompts, one per routing outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallerPrompts {
    /// Opening prompt asking for the reason of the call
    pub greeting: String,
    /// Spoken when the greeting gather hears nothing
    pub no_input: String,
    /// Clarifying question when the classifier does not provide one
    pub clarify_default: String,
    pub transfer: String,
    pub transfer_after_clarification: String,
    pub voicemail: String,
    pub voicemail_after_clarification: String,
    /// First-pass urgent verdict below the threshold
    pub voicemail_low_confidence: String,
    /// Spoken before voicemail when the call could not be handled
    pub apology: String,
    /// Spoken before hanging up a resolved call
    pub closing: String,
}

impl Default for CallerPrompts {
    fn default() -> Self {
        Self {
            greeting: "Bonjour. Expliquez en une phrase la raison de votre appel.".to_string(),
            no_input: "Nous n'avons pas reçu votre message. Au revoir.".to_string(),
            clarify_default: "Pouvez-vous préciser s'il vous plaît ?".to_string(),
            transfer: "Cet appel semble urgent. Je vous transfère maintenant.".to_string(),
            transfer_after_clarification: "Merci. Je vous transfère maintenant.".to_string(),
            voicemail: "Ce n'est pas considéré comme urgent. Laissez votre message après le bip."
                .to_string(),
            voicemail_after_clarification:
                "Ce n'est pas urgent. Laissez votre message après le bip.".to_string(),
            voicemail_low_confidence:
                "Nous ne pouvons pas confirmer l'urgence de votre appel. Laissez votre message après le bip."
                    .to_string(),
            apology: "Désolé, une erreur est survenue. Laissez votre message après le bip."
                .to_string(),
            closing: "Merci de votre appel. Au revoir.".to_string(),
        }
    }
}
