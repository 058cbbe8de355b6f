//! Urgency verdicts
//!
//! A verdict is produced fresh for every classified utterance and never
//! mutated afterwards. `Classification` pairs it with where it came from, so
//! callers can tell a model verdict from a degraded-mode fallback without
//! any change in control flow.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Urgency label assigned to one utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UrgencyLabel {
    #[serde(rename = "urgent")]
    Urgent,
    #[serde(rename = "non-urgent", alias = "non_urgent", alias = "nonurgent")]
    NonUrgent,
    #[serde(rename = "clarify", alias = "needs_clarification")]
    NeedsClarification,
}

impl UrgencyLabel {
    /// Wire name, as exchanged with the classification model
    pub fn as_str(&self) -> &'static str {
        match self {
            UrgencyLabel::Urgent => "urgent",
            UrgencyLabel::NonUrgent => "non-urgent",
            UrgencyLabel::NeedsClarification => "clarify",
        }
    }

    /// Lenient parse of a label produced by a model
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();
        match normalized.as_str() {
            "urgent" => Some(UrgencyLabel::Urgent),
            "nonurgent" | "noturgent" => Some(UrgencyLabel::NonUrgent),
            "clarify" | "needsclarification" | "clarification" => {
                Some(UrgencyLabel::NeedsClarification)
            }
            _ => None,
        }
    }
}

impl fmt::Display for UrgencyLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured urgency classification for one utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationVerdict {
    pub label: UrgencyLabel,
    /// Always within [0, 1]
    pub confidence: f32,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clarify_question: Option<String>,
}

impl ClassificationVerdict {
    /// Create a verdict, clamping confidence into [0, 1]
    pub fn new(label: UrgencyLabel, confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            label,
            confidence: clamp_confidence(confidence),
            reason: reason.into(),
            clarify_question: None,
        }
    }

    pub fn with_clarify_question(mut self, question: Option<String>) -> Self {
        self.clarify_question = question
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        self
    }

    pub fn is_urgent(&self) -> bool {
        self.label == UrgencyLabel::Urgent
    }
}

/// Clamp a confidence into [0, 1]; NaN becomes 0
pub fn clamp_confidence(confidence: f32) -> f32 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Why the classifier fell back to the keyword heuristic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackCause {
    /// Request exceeded the configured deadline
    Timeout,
    /// Connection or transport failure
    Transport,
    /// Non-2xx reply
    HttpStatus(u16),
    /// Reply was not JSON or lacked a required field
    MalformedReply,
    /// No request slot freed up before the deadline
    Saturated,
}

impl FallbackCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            FallbackCause::Timeout => "timeout",
            FallbackCause::Transport => "transport",
            FallbackCause::HttpStatus(_) => "http_status",
            FallbackCause::MalformedReply => "malformed_reply",
            FallbackCause::Saturated => "saturated",
        }
    }
}

/// Where a verdict came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "cause")]
pub enum VerdictSource {
    /// Well-formed reply from the external classifier
    Model,
    /// Keyword heuristic after the external classifier failed
    Fallback(FallbackCause),
    /// Nothing to classify; no external call was made
    EmptyTranscript,
}

impl VerdictSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictSource::Model => "model",
            VerdictSource::Fallback(_) => "fallback",
            VerdictSource::EmptyTranscript => "empty_transcript",
        }
    }
}

/// Verdict plus its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub verdict: ClassificationVerdict,
    pub source: VerdictSource,
}

impl Classification {
    pub fn from_model(verdict: ClassificationVerdict) -> Self {
        Self {
            verdict,
            source: VerdictSource::Model,
        }
    }

    pub fn fallback(verdict: ClassificationVerdict, cause: FallbackCause) -> Self {
        Self {
            verdict,
            source: VerdictSource::Fallback(cause),
        }
    }

    pub fn empty_transcript(verdict: ClassificationVerdict) -> Self {
        Self {
            verdict,
            source: VerdictSource::EmptyTranscript,
        }
    }

    /// True when the external classifier was wanted but could not be used
    pub fn is_degraded(&self) -> bool {
        matches!(self.source, VerdictSource::Fallback(_))
    }
}
