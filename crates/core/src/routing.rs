//! Routing decisions
//!
//! A decision is derived per event and consumed immediately by the webhook
//! adapter, which renders it into carrier call-control instructions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{Classification, Stage};

/// What the carrier should do next with the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingAction {
    /// Play the prompt and gather the caller's first utterance
    GatherSpeech,
    /// Play a clarifying question and gather the answer
    AskClarifyingQuestion,
    /// Announce and bridge the call to the operator
    Transfer,
    /// Prompt and record a voicemail
    RecordVoicemail,
    /// Play the prompt and hang up
    Terminate,
}

impl RoutingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingAction::GatherSpeech => "gather_speech",
            RoutingAction::AskClarifyingQuestion => "ask_clarifying_question",
            RoutingAction::Transfer => "transfer",
            RoutingAction::RecordVoicemail => "record_voicemail",
            RoutingAction::Terminate => "terminate",
        }
    }

    /// Whether the action ends the triage conversation
    pub fn resolves_call(&self) -> bool {
        matches!(
            self,
            RoutingAction::Transfer | RoutingAction::RecordVoicemail | RoutingAction::Terminate
        )
    }
}

impl fmt::Display for RoutingAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Next prompt, action and stage for a call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    /// Text spoken to the caller
    pub caller_prompt: String,
    pub action: RoutingAction,
    /// Stage the carrier's next event belongs to
    pub next_stage: Stage,
    /// Operator notification to dispatch, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notify_message: Option<String>,
    /// Classification behind the decision (absent when none was made)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<Classification>,
}

impl RoutingDecision {
    pub fn new(caller_prompt: impl Into<String>, action: RoutingAction, next_stage: Stage) -> Self {
        Self {
            caller_prompt: caller_prompt.into(),
            action,
            next_stage,
            notify_message: None,
            classification: None,
        }
    }

    pub fn with_notification(mut self, message: impl Into<String>) -> Self {
        self.notify_message = Some(message.into());
        self
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = Some(classification);
        self
    }
}
