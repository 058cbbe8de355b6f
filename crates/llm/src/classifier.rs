//! Urgency classifier backed by a chat model
//!
//! The classifier is a hard failure-isolation boundary. Every failure on the
//! model path (no free request slot, transport error, deadline, non-2xx,
//! unparseable reply) is turned into a keyword-fallback verdict tagged with
//! its cause; `classify` itself cannot fail.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};

use call_filter_config::ClassifierConfig;
use call_filter_core::{Classification, ClassificationVerdict, UrgencyClassifier, UrgencyLabel};

use crate::backend::{LlmBackend, OpenAIBackend, OpenAIConfig};
use crate::fallback::KeywordFallback;
use crate::prompt::ClassificationPrompt;
use crate::LlmError;

/// Classifier calling an `LlmBackend`, with keyword fallback
pub struct LlmUrgencyClassifier {
    backend: Arc<dyn LlmBackend>,
    prompt: ClassificationPrompt,
    fallback: KeywordFallback,
    permits: Arc<Semaphore>,
    timeout: Duration,
}

impl LlmUrgencyClassifier {
    /// `permits` bounds in-flight requests; `timeout` covers waiting for a
    /// permit plus the request itself
    pub fn new(
        backend: Arc<dyn LlmBackend>,
        fallback: KeywordFallback,
        permits: Arc<Semaphore>,
        timeout: Duration,
    ) -> Self {
        Self {
            backend,
            prompt: ClassificationPrompt::new(),
            fallback,
            permits,
            timeout,
        }
    }

    /// Build the OpenAI-compatible classifier described by `config`
    pub fn from_config(config: &ClassifierConfig) -> Result<Self, LlmError> {
        let backend = OpenAIBackend::new(OpenAIConfig::from(config))?;
        if config.api_key().is_none() {
            tracing::warn!(
                endpoint = %config.endpoint,
                "No classifier API key configured; requests will likely be rejected"
            );
        }

        Ok(Self::new(
            Arc::new(backend),
            KeywordFallback::new(config.urgency_keywords.iter().cloned()),
            Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
            config.timeout(),
        ))
    }

    pub fn fallback(&self) -> &KeywordFallback {
        &self.fallback
    }

    /// Acquire a slot and query the model, all under one deadline
    async fn request_within_deadline(
        &self,
        transcript: &str,
        context: &str,
    ) -> Result<ClassificationVerdict, LlmError> {
        let deadline = Instant::now() + self.timeout;

        let _permit = match timeout_at(deadline, self.permits.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) | Err(_) => return Err(LlmError::Saturated),
        };

        match timeout_at(deadline, self.request_verdict(transcript, context)).await {
            Ok(result) => result,
            Err(_) => Err(LlmError::Timeout),
        }
    }

    async fn request_verdict(
        &self,
        transcript: &str,
        context: &str,
    ) -> Result<ClassificationVerdict, LlmError> {
        let messages = self.prompt.build(transcript, context);
        let result = self.backend.generate(&messages).await?;

        tracing::debug!(
            model = self.backend.model_name(),
            latency_ms = result.total_time_ms,
            tokens = result.tokens,
            finish_reason = ?result.finish_reason,
            "Classifier replied"
        );

        parse_reply(&result.text).map_err(|e| {
            tracing::warn!(raw = %result.text, error = %e, "Unparseable classifier reply");
            e
        })
    }
}

#[async_trait]
impl UrgencyClassifier for LlmUrgencyClassifier {
    async fn classify(&self, transcript: &str, context: &str) -> Classification {
        if transcript.trim().is_empty() {
            tracing::debug!("Empty transcript, classifier not consulted");
            return Classification::empty_transcript(KeywordFallback::default_verdict());
        }

        match self.request_within_deadline(transcript, context).await {
            Ok(verdict) => Classification::from_model(verdict),
            Err(err) => {
                let cause = err.fallback_cause();
                let verdict = self.fallback.classify(transcript);
                tracing::warn!(
                    error = %err,
                    cause = cause.as_str(),
                    label = verdict.label.as_str(),
                    reason = %verdict.reason,
                    "Classifier unavailable, using keyword fallback"
                );
                Classification::fallback(verdict, cause)
            }
        }
    }

    fn name(&self) -> &str {
        "llm"
    }
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    label: String,
    confidence: RawConfidence,
    reason: String,
    #[serde(default, rename = "clarifyQuestion", alias = "clarify_question")]
    clarify_question: Option<String>,
}

/// Models occasionally quote numbers
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawConfidence {
    Number(f64),
    Text(String),
}

impl RawConfidence {
    fn value(&self) -> Option<f32> {
        match self {
            RawConfidence::Number(n) => Some(*n as f32),
            RawConfidence::Text(s) => s.trim().parse::<f32>().ok(),
        }
    }
}

/// Parse a model reply into a verdict
///
/// The JSON object starts at the first `{`; any prose or code fence before it
/// is skipped, as is anything after the object. `label`, `confidence` and
/// `reason` are required and the label must be one of the three known ones.
pub fn parse_reply(text: &str) -> Result<ClassificationVerdict, LlmError> {
    let start = text
        .find('{')
        .ok_or_else(|| LlmError::InvalidResponse("reply contains no JSON object".to_string()))?;

    let raw: RawVerdict = serde_json::Deserializer::from_str(&text[start..])
        .into_iter::<RawVerdict>()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("empty reply".to_string()))?
        .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

    let label = UrgencyLabel::parse_lenient(&raw.label)
        .ok_or_else(|| LlmError::InvalidResponse(format!("unknown label '{}'", raw.label)))?;

    let confidence = raw.confidence.value().ok_or_else(|| {
        LlmError::InvalidResponse("confidence is not a number".to_string())
    })?;

    Ok(ClassificationVerdict::new(label, confidence, raw.reason)
        .with_clarify_question(raw.clarify_question))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_well_formed_reply() {
        let verdict = parse_reply(
            r#"{"label":"clarify","confidence":0.4,"reason":"ambigu","clarifyQuestion":"Quelqu'un est-il blessé ?"}"#,
        )
        .unwrap();
        assert_eq!(verdict.label, UrgencyLabel::NeedsClarification);
        assert_eq!(verdict.confidence, 0.4);
        assert_eq!(verdict.reason, "ambigu");
        assert_eq!(
            verdict.clarify_question.as_deref(),
            Some("Quelqu'un est-il blessé ?")
        );
    }

    #[test]
    fn test_parse_skips_leading_prose_and_trailing_fence() {
        let verdict = parse_reply(
            "Voici:\n```json\n{\"label\":\"urgent\",\"confidence\":0.97,\"reason\":\"incendie\"}\n```",
        )
        .unwrap();
        assert_eq!(verdict.label, UrgencyLabel::Urgent);
        assert!(verdict.clarify_question.is_none());
    }

    #[test]
    fn test_parse_clamps_confidence() {
        let verdict =
            parse_reply(r#"{"label":"non-urgent","confidence":1.8,"reason":"x"}"#).unwrap();
        assert_eq!(verdict.confidence, 1.0);

        let verdict =
            parse_reply(r#"{"label":"urgent","confidence":"0.7","reason":"x"}"#).unwrap();
        assert_eq!(verdict.confidence, 0.7);
    }

    #[test]
    fn test_parse_accepts_snake_case_question() {
        let verdict = parse_reply(
            r#"{"label":"clarify","confidence":0.5,"reason":"x","clarify_question":"Où êtes-vous ?"}"#,
        )
        .unwrap();
        assert_eq!(verdict.clarify_question.as_deref(), Some("Où êtes-vous ?"));
    }

    #[test]
    fn test_parse_rejects_malformed_replies() {
        assert!(parse_reply("je ne sais pas").is_err());
        assert!(parse_reply("{\"label\":\"urgent\"").is_err());
        assert!(parse_reply(r#"{"label":"urgent","reason":"x"}"#).is_err());
        assert!(parse_reply(r#"{"label":"peut-être","confidence":0.5,"reason":"x"}"#).is_err());
        assert!(parse_reply(r#"{"label":"urgent","confidence":"beaucoup","reason":"x"}"#).is_err());
    }
}
