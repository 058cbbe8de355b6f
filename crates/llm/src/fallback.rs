//! Keyword heuristic used whenever the model cannot be consulted

use call_filter_config::constants::classifier::DEFAULT_URGENCY_KEYWORDS;
use call_filter_core::{ClassificationVerdict, UrgencyLabel};

/// Confidence of a keyword hit
pub const KEYWORD_CONFIDENCE: f32 = 0.9;
/// Confidence of the no-match default
pub const DEFAULT_CONFIDENCE: f32 = 0.6;
pub const DEFAULT_REASON: &str = "fallback";

/// Ordered keyword scan over the lowercased transcript
///
/// Pure and deterministic: the same transcript always yields the same verdict.
#[derive(Debug, Clone)]
pub struct KeywordFallback {
    keywords: Vec<String>,
}

impl KeywordFallback {
    /// Keywords are matched in order, first hit wins
    pub fn new(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn classify(&self, transcript: &str) -> ClassificationVerdict {
        let lowered = transcript.to_lowercase();
        match self.keywords.iter().find(|k| lowered.contains(k.as_str())) {
            Some(keyword) => ClassificationVerdict::new(
                UrgencyLabel::Urgent,
                KEYWORD_CONFIDENCE,
                format!("keyword:{}", keyword),
            ),
            None => Self::default_verdict(),
        }
    }

    /// Verdict for transcripts with no keyword (and for empty ones)
    pub fn default_verdict() -> ClassificationVerdict {
        ClassificationVerdict::new(UrgencyLabel::NonUrgent, DEFAULT_CONFIDENCE, DEFAULT_REASON)
    }
}

impl Default for KeywordFallback {
    fn default() -> Self {
        Self::new(DEFAULT_URGENCY_KEYWORDS.iter().copied())
    }
}
