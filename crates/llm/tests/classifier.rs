//! Classifier behaviour against scripted and unreachable backends

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use call_filter_config::ClassifierConfig;
use call_filter_core::{FallbackCause, UrgencyClassifier, UrgencyLabel, VerdictSource};
use call_filter_llm::{
    FinishReason, GenerationResult, KeywordFallback, LlmBackend, LlmError, LlmUrgencyClassifier,
    Message,
};

/// Replies with a fixed outcome after an optional delay, counting calls
struct ScriptedBackend {
    reply: Result<String, u16>,
    delay: Duration,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    fn replying(text: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(text.to_string()),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            reply: Err(status),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply: Ok(r#"{"label":"urgent","confidence":0.9,"reason":"x"}"#.to_string()),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    async fn generate(&self, _messages: &[Message]) -> Result<GenerationResult, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        match &self.reply {
            Ok(text) => Ok(GenerationResult {
                text: text.clone(),
                tokens: 0,
                total_time_ms: 0,
                finish_reason: FinishReason::Stop,
            }),
            Err(status) => Err(LlmError::Api {
                status: *status,
                body: String::new(),
            }),
        }
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn classifier(backend: Arc<ScriptedBackend>, timeout: Duration) -> LlmUrgencyClassifier {
    LlmUrgencyClassifier::new(
        backend,
        KeywordFallback::default(),
        Arc::new(Semaphore::new(4)),
        timeout,
    )
}

/// Config pointing at a local port nothing listens on
fn unreachable_config() -> ClassifierConfig {
    ClassifierConfig {
        endpoint: "http://127.0.0.1:9/v1".to_string(),
        timeout_ms: 2_000,
        ..Default::default()
    }
}

#[tokio::test]
async fn test_model_verdict_is_returned() {
    let backend = ScriptedBackend::replying(
        r#"{"label":"non-urgent","confidence":0.82,"reason":"message simple"}"#,
    );
    let classifier = classifier(backend.clone(), Duration::from_secs(1));

    let result = classifier
        .classify("Je veux juste laisser un message", "from:+33600000000")
        .await;

    assert_eq!(result.source, VerdictSource::Model);
    assert_eq!(result.verdict.label, UrgencyLabel::NonUrgent);
    assert_eq!(result.verdict.confidence, 0.82);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_malformed_reply_falls_back_to_keywords() {
    let backend = ScriptedBackend::replying("Désolé, je ne peux pas répondre.");
    let classifier = classifier(backend, Duration::from_secs(1));

    let result = classifier.classify("Il y a un incendie chez moi", "").await;

    assert_eq!(result.source, VerdictSource::Fallback(FallbackCause::MalformedReply));
    assert_eq!(result.verdict.label, UrgencyLabel::Urgent);
    assert_eq!(result.verdict.confidence, 0.9);
    assert_eq!(result.verdict.reason, "keyword:incendie");
}

#[tokio::test]
async fn test_http_error_falls_back() {
    let classifier = classifier(ScriptedBackend::failing(500), Duration::from_secs(1));

    let result = classifier.classify("Je rappellerai demain", "").await;

    assert_eq!(result.source, VerdictSource::Fallback(FallbackCause::HttpStatus(500)));
    assert_eq!(result.verdict.label, UrgencyLabel::NonUrgent);
    assert_eq!(result.verdict.reason, "fallback");
    assert!(result.is_degraded());
}

#[tokio::test]
async fn test_deadline_falls_back() {
    let classifier = classifier(
        ScriptedBackend::slow(Duration::from_secs(5)),
        Duration::from_millis(50),
    );

    let result = classifier.classify("appelez une ambulance", "").await;

    assert_eq!(result.source, VerdictSource::Fallback(FallbackCause::Timeout));
    assert_eq!(result.verdict.reason, "keyword:ambulance");
}

#[tokio::test]
async fn test_no_free_slot_falls_back() {
    let permits = Arc::new(Semaphore::new(1));
    let _held = permits.clone().acquire_owned().await.unwrap();
    let backend = ScriptedBackend::replying(r#"{"label":"urgent","confidence":1,"reason":"x"}"#);
    let classifier = LlmUrgencyClassifier::new(
        backend.clone(),
        KeywordFallback::default(),
        permits,
        Duration::from_millis(50),
    );

    let result = classifier.classify("danger", "").await;

    assert_eq!(result.source, VerdictSource::Fallback(FallbackCause::Saturated));
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_empty_transcript_skips_backend() {
    let backend = ScriptedBackend::replying(r#"{"label":"urgent","confidence":1,"reason":"x"}"#);
    let classifier = classifier(backend.clone(), Duration::from_secs(1));

    let result = classifier.classify("   ", "from:unknown").await;

    assert_eq!(result.source, VerdictSource::EmptyTranscript);
    assert_eq!(result.verdict.label, UrgencyLabel::NonUrgent);
    assert_eq!(result.verdict.confidence, 0.6);
    assert_eq!(backend.calls(), 0);
}

#[tokio::test]
async fn test_unreachable_endpoint_keyword_hit() {
    let classifier = LlmUrgencyClassifier::from_config(&unreachable_config()).unwrap();

    let result = classifier
        .classify("Il y a un incendie chez moi", "from:+33600000000")
        .await;

    assert!(result.is_degraded());
    assert_eq!(result.verdict.label, UrgencyLabel::Urgent);
    assert_eq!(result.verdict.confidence, 0.9);
    assert_eq!(result.verdict.reason, "keyword:incendie");
}

#[tokio::test]
async fn test_fallback_is_deterministic() {
    let classifier = LlmUrgencyClassifier::from_config(&unreachable_config()).unwrap();

    let first = classifier.classify("la police arrive ?", "").await;
    let second = classifier.classify("la police arrive ?", "").await;

    assert_eq!(first.verdict, second.verdict);
    assert_eq!(first.verdict.reason, "keyword:police");
}
