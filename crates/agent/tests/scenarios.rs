//! Whole calls driven through the triage machine

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use call_filter_agent::TriageMachine;
use call_filter_config::{ClassifierConfig, NotificationTemplates, TriageConfig};
use call_filter_core::{
    CallContext, Classification, ClassificationVerdict, RoutingAction, Stage, UrgencyClassifier,
    UrgencyLabel, VerdictSource,
};
use call_filter_llm::LlmUrgencyClassifier;

/// Returns queued verdicts in order and records what it was asked
#[derive(Default)]
struct ScriptedClassifier {
    verdicts: Mutex<VecDeque<ClassificationVerdict>>,
    contexts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl ScriptedClassifier {
    fn with(verdicts: Vec<ClassificationVerdict>) -> Arc<Self> {
        Arc::new(Self {
            verdicts: Mutex::new(verdicts.into()),
            ..Default::default()
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UrgencyClassifier for ScriptedClassifier {
    async fn classify(&self, _transcript: &str, context: &str) -> Classification {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().unwrap().push(context.to_string());
        let verdict = self
            .verdicts
            .lock()
            .unwrap()
            .pop_front()
            .expect("classifier called more often than scripted");
        Classification::from_model(verdict)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn machine(classifier: Arc<dyn UrgencyClassifier>) -> TriageMachine {
    TriageMachine::new(
        TriageConfig::default(),
        NotificationTemplates::default(),
        classifier,
    )
}

fn verdict(label: UrgencyLabel, confidence: f32) -> ClassificationVerdict {
    ClassificationVerdict::new(label, confidence, "scripted")
}

#[tokio::test]
async fn unreachable_model_keyword_hit_transfers() {
    let classifier = LlmUrgencyClassifier::from_config(&ClassifierConfig {
        endpoint: "http://127.0.0.1:9/v1".to_string(),
        timeout_ms: 2_000,
        ..Default::default()
    })
    .unwrap();
    let machine = machine(Arc::new(classifier));
    let mut call = CallContext::new("+33600000000", Stage::AwaitingInitialSpeech);

    let decision = machine.advance(&mut call, "Il y a un incendie chez moi").await;

    assert_eq!(decision.action, RoutingAction::Transfer);
    assert_eq!(decision.next_stage, Stage::Resolved);
    let classification = decision.classification.unwrap();
    assert!(classification.is_degraded());
    assert_eq!(classification.verdict.label, UrgencyLabel::Urgent);
    assert_eq!(classification.verdict.confidence, 0.9);
    assert_eq!(classification.verdict.reason, "keyword:incendie");
    assert!(decision
        .notify_message
        .unwrap()
        .contains("Il y a un incendie chez moi"));
}

#[tokio::test]
async fn non_urgent_records_voicemail() {
    let classifier = ScriptedClassifier::with(vec![verdict(UrgencyLabel::NonUrgent, 0.8)]);
    let machine = machine(classifier.clone());
    let mut call = CallContext::new("+33600000000", Stage::AwaitingInitialSpeech);

    let decision = machine
        .advance(&mut call, "Je veux juste laisser un message")
        .await;

    assert_eq!(decision.action, RoutingAction::RecordVoicemail);
    assert_eq!(
        decision.caller_prompt,
        "Ce n'est pas considéré comme urgent. Laissez votre message après le bip."
    );
    assert!(decision.notify_message.is_some());
    assert_eq!(classifier.calls(), 1);
    assert_eq!(
        classifier.contexts.lock().unwrap()[0],
        "from:+33600000000"
    );
}

#[tokio::test]
async fn empty_transcript_skips_classifier() {
    let classifier = ScriptedClassifier::with(vec![]);
    let machine = machine(classifier.clone());
    let mut call = CallContext::new("+33600000000", Stage::AwaitingInitialSpeech);

    let decision = machine.advance(&mut call, "").await;

    assert_eq!(decision.action, RoutingAction::RecordVoicemail);
    assert_eq!(decision.next_stage, Stage::Resolved);
    assert_eq!(
        decision.classification.map(|c| c.source),
        Some(VerdictSource::EmptyTranscript)
    );
    assert_eq!(classifier.calls(), 0);
    assert_eq!(call.attempt_count, 1);
}

#[tokio::test]
async fn single_clarification_round_ends_in_voicemail() {
    let classifier = ScriptedClassifier::with(vec![
        ClassificationVerdict::new(UrgencyLabel::NeedsClarification, 0.4, "ambigu")
            .with_clarify_question(Some("Quelqu'un est-il blessé ?".to_string())),
        verdict(UrgencyLabel::NonUrgent, 0.85),
    ]);
    let machine = machine(classifier.clone());

    // First round-trip: initial speech
    let mut call = CallContext::new("+33600000000", Stage::AwaitingInitialSpeech);
    let first = machine.advance(&mut call, "Il s'est passé quelque chose").await;
    assert_eq!(first.action, RoutingAction::AskClarifyingQuestion);
    assert_eq!(first.caller_prompt, "Quelqu'un est-il blessé ?");
    assert_eq!(first.next_stage, Stage::AwaitingClarification);
    assert!(first.notify_message.is_none());

    // Second round-trip arrives on the clarification endpoint
    let mut call = CallContext::new("+33600000000", first.next_stage);
    let second = machine.advance(&mut call, "non ce n'est pas grave").await;
    assert_eq!(second.action, RoutingAction::RecordVoicemail);
    assert_eq!(second.next_stage, Stage::Resolved);
    assert_eq!(
        second.notify_message.as_deref(),
        Some("Message non-urgent (après clarification) de +33600000000. Transcript: non ce n'est pas grave")
    );
    assert_eq!(call.attempt_count, 2);

    // Nothing further is classified once resolved
    let mut call = CallContext::new("+33600000000", second.next_stage);
    let third = machine.advance(&mut call, "allô ?").await;
    assert_eq!(third.action, RoutingAction::Terminate);
    assert!(third.classification.is_none());
    assert_eq!(classifier.calls(), 2);
}

#[tokio::test]
async fn clarification_answer_never_asks_again() {
    let classifier = ScriptedClassifier::with(vec![verdict(UrgencyLabel::NeedsClarification, 0.9)]);
    let machine = machine(classifier);
    let mut call = CallContext::new("", Stage::AwaitingClarification);

    let decision = machine.advance(&mut call, "je ne sais pas").await;

    assert_eq!(decision.action, RoutingAction::RecordVoicemail);
    assert_eq!(decision.next_stage, Stage::Resolved);
}

#[tokio::test]
async fn urgent_after_clarification_transfers_at_any_confidence() {
    let classifier = ScriptedClassifier::with(vec![verdict(UrgencyLabel::Urgent, 0.2)]);
    let machine = machine(classifier);
    let mut call = CallContext::new("+33611111111", Stage::AwaitingClarification);

    let decision = machine.advance(&mut call, "oui il saigne").await;

    assert_eq!(decision.action, RoutingAction::Transfer);
    assert_eq!(decision.caller_prompt, "Merci. Je vous transfère maintenant.");
}

#[tokio::test]
async fn greeting_does_not_classify() {
    let classifier = ScriptedClassifier::with(vec![]);
    let machine = machine(classifier.clone());
    let mut call = CallContext::new("+33600000000", Stage::Greeting);

    let decision = machine.advance(&mut call, "bonjour").await;

    assert_eq!(decision.action, RoutingAction::GatherSpeech);
    assert_eq!(decision.next_stage, Stage::AwaitingInitialSpeech);
    assert_eq!(classifier.calls(), 0);
}
