//! Call stages and per-request call context
//!
//! Nothing here outlives a single webhook round-trip. The carrier delivers
//! each event to the endpoint of the next stage, and the adapter rebuilds a
//! `CallContext` from that endpoint and the event payload.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Position of the caller in the triage conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Call just answered, opening prompt not yet played
    #[default]
    Greeting,
    /// Waiting for the caller's first utterance
    AwaitingInitialSpeech,
    /// One clarifying question asked, waiting for the answer
    AwaitingClarification,
    /// Call routed to transfer, voicemail or hangup
    Resolved,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Greeting => "greeting",
            Stage::AwaitingInitialSpeech => "awaiting_initial_speech",
            Stage::AwaitingClarification => "awaiting_clarification",
            Stage::Resolved => "resolved",
        }
    }

    /// Whether a speech transcript in this stage goes to the classifier
    pub fn classifies_speech(&self) -> bool {
        matches!(self, Stage::AwaitingInitialSpeech | Stage::AwaitingClarification)
    }

    /// Number of utterances the caller has already given on entering this stage
    pub fn prior_attempts(&self) -> u32 {
        match self {
            Stage::Greeting | Stage::AwaitingInitialSpeech => 0,
            Stage::AwaitingClarification => 1,
            Stage::Resolved => 2,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "greeting" => Ok(Stage::Greeting),
            "awaiting_initial_speech" | "initial" => Ok(Stage::AwaitingInitialSpeech),
            "awaiting_clarification" | "clarify" => Ok(Stage::AwaitingClarification),
            "resolved" => Ok(Stage::Resolved),
            _ => Err(Error::UnexpectedStage(s.to_string())),
        }
    }
}

/// State of one call for the duration of one webhook round-trip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallContext {
    /// Caller number as reported by the carrier (may be empty)
    pub caller_id: String,
    pub current_stage: Stage,
    /// Utterances heard so far, oldest first
    pub accumulated_transcript: Vec<String>,
    /// Number of utterances given, including the current one once recorded
    pub attempt_count: u32,
    /// Carrier call identifier, for log correlation only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_sid: Option<String>,
}

impl CallContext {
    pub fn new(caller_id: impl Into<String>, stage: Stage) -> Self {
        Self {
            caller_id: caller_id.into(),
            current_stage: stage,
            accumulated_transcript: Vec::new(),
            attempt_count: stage.prior_attempts(),
            call_sid: None,
        }
    }

    pub fn with_call_sid(mut self, call_sid: Option<String>) -> Self {
        self.call_sid = call_sid.filter(|sid| !sid.trim().is_empty());
        self
    }

    /// Record the caller's latest utterance
    ///
    /// Empty utterances still count as an attempt but are not kept.
    pub fn record_utterance(&mut self, transcript: &str) {
        self.attempt_count += 1;
        let trimmed = transcript.trim();
        if !trimmed.is_empty() {
            self.accumulated_transcript.push(trimmed.to_string());
        }
    }

    /// Caller id for display, with empty ids normalized to `unknown`
    pub fn caller_label(&self) -> &str {
        let caller = self.caller_id.trim();
        if caller.is_empty() {
            "unknown"
        } else {
            caller
        }
    }

    /// Context string passed to the classifier alongside the transcript
    ///
    /// Earlier utterances are included so the answer to a clarifying question
    /// is judged together with the original request when it is known.
    pub fn classifier_context(&self) -> String {
        let mut context = format!("from:{}", self.caller_label());
        let earlier = self.accumulated_transcript.len().saturating_sub(1);
        if earlier > 0 {
            let previous = self.accumulated_transcript[..earlier].join(" | ");
            context.push_str(&format!(" previous:\"{}\"", previous));
        }
        context
    }

    /// Full transcript joined for summaries
    pub fn transcript_summary(&self) -> String {
        self.accumulated_transcript.join(" / ")
    }
}
