//! Triage state machine

use std::sync::Arc;

use call_filter_config::{NotificationTemplates, TriageConfig};
use call_filter_core::{
    CallContext, Classification, Error, RoutingAction, RoutingDecision, Stage, UrgencyClassifier,
};
use call_filter_llm::KeywordFallback;

use crate::resolution::{resolve, Resolution};

/// Decides the next step of a call from its stage and the caller's speech
///
/// Holds no per-call state. Every call's state arrives in the `CallContext`
/// built by the webhook adapter for the current round-trip.
pub struct TriageMachine {
    config: TriageConfig,
    templates: NotificationTemplates,
    classifier: Arc<dyn UrgencyClassifier>,
    /// Whether urgent calls can be bridged to an operator number
    transfer_available: bool,
}

impl TriageMachine {
    pub fn new(
        config: TriageConfig,
        templates: NotificationTemplates,
        classifier: Arc<dyn UrgencyClassifier>,
    ) -> Self {
        Self {
            config,
            templates,
            classifier,
            transfer_available: true,
        }
    }

    /// Without a transfer target, urgent verdicts are routed to voicemail
    /// and the operator is told the call was not bridged
    pub fn with_transfer_available(mut self, available: bool) -> Self {
        self.transfer_available = available;
        self
    }

    pub fn transfer_available(&self) -> bool {
        self.transfer_available
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn classifier(&self) -> &Arc<dyn UrgencyClassifier> {
        &self.classifier
    }

    /// Handle one speech event for the call in `context`
    ///
    /// The utterance is recorded on the context. Only the two awaiting stages
    /// consult the classifier, and only with a non-empty transcript.
    pub async fn advance(&self, context: &mut CallContext, transcript: &str) -> RoutingDecision {
        let stage = context.current_stage;
        let decision = match stage {
            Stage::Greeting => self.greet(),
            Stage::Resolved => {
                tracing::debug!(caller_id = %context.caller_label(), "Speech after call resolved");
                RoutingDecision::new(
                    self.config.prompts.closing.clone(),
                    RoutingAction::Terminate,
                    Stage::Resolved,
                )
            }
            Stage::AwaitingInitialSpeech | Stage::AwaitingClarification => {
                context.record_utterance(transcript);
                let classification = if transcript.trim().is_empty() {
                    Classification::empty_transcript(KeywordFallback::default_verdict())
                } else {
                    self.classifier
                        .classify(transcript, &context.classifier_context())
                        .await
                };
                self.decide(context, classification)
            }
        };

        tracing::info!(
            caller_id = %context.caller_label(),
            call_sid = context.call_sid.as_deref().unwrap_or(""),
            stage = stage.as_str(),
            action = decision.action.as_str(),
            next_stage = decision.next_stage.as_str(),
            "Call advanced"
        );

        decision
    }

    /// Opening turn: play the greeting and gather the first utterance
    pub fn greet(&self) -> RoutingDecision {
        RoutingDecision::new(
            self.config.prompts.greeting.clone(),
            RoutingAction::GatherSpeech,
            Stage::AwaitingInitialSpeech,
        )
    }

    /// Turn a classification into a decision, without any I/O
    ///
    /// The stage comes from `context`; the caller id and transcript feed the
    /// operator notification. Non-classifying stages are treated as an
    /// unexpected stage so the caller still reaches voicemail.
    pub fn decide(&self, context: &CallContext, classification: Classification) -> RoutingDecision {
        let stage = context.current_stage;
        let Some(resolution) =
            resolve(stage, &classification.verdict, self.config.urgent_threshold)
        else {
            return self.unexpected_stage(context, stage.as_str());
        };

        tracing::debug!(
            stage = stage.as_str(),
            label = classification.verdict.label.as_str(),
            confidence = classification.verdict.confidence,
            source = classification.source.as_str(),
            resolution = resolution.as_str(),
            "Verdict resolved"
        );

        if resolution.action() == RoutingAction::Transfer && !self.transfer_available {
            tracing::warn!(
                caller_id = %context.caller_label(),
                resolution = resolution.as_str(),
                "No transfer target, recording voicemail instead"
            );
            return RoutingDecision::new(
                self.config.prompts.apology.clone(),
                RoutingAction::RecordVoicemail,
                Stage::Resolved,
            )
            .with_classification(classification)
            .with_notification(self.summarize(&self.templates.voicemail_no_forward, context));
        }

        let prompts = &self.config.prompts;
        let prompt = match resolution {
            Resolution::Clarify => classification
                .verdict
                .clarify_question
                .clone()
                .unwrap_or_else(|| prompts.clarify_default.clone()),
            Resolution::Transfer => prompts.transfer.clone(),
            Resolution::TransferAfterClarification => prompts.transfer_after_clarification.clone(),
            Resolution::Voicemail => prompts.voicemail.clone(),
            Resolution::VoicemailAfterClarification => {
                prompts.voicemail_after_clarification.clone()
            }
            Resolution::VoicemailLowConfidence => prompts.voicemail_low_confidence.clone(),
        };

        let mut decision = RoutingDecision::new(prompt, resolution.action(), resolution.next_stage())
            .with_classification(classification);
        if let Some(template) = self.notification_template(resolution) {
            decision = decision.with_notification(self.summarize(template, context));
        }
        decision
    }

    /// Route a call whose stage could not be handled to voicemail
    pub fn unexpected_stage(&self, context: &CallContext, stage: &str) -> RoutingDecision {
        let err = Error::UnexpectedStage(stage.to_string());
        tracing::warn!(
            caller_id = %context.caller_label(),
            error = %err,
            "Routing call to voicemail"
        );

        RoutingDecision::new(
            self.config.prompts.apology.clone(),
            RoutingAction::RecordVoicemail,
            Stage::Resolved,
        )
        .with_notification(self.summarize(&self.templates.voicemail_unexpected_stage, context))
    }

    /// Operator message for a completed voicemail recording
    pub fn voicemail_saved_message(&self, caller_id: &str, recording: &str) -> String {
        let caller = match caller_id.trim() {
            "" => "unknown",
            caller => caller,
        };
        NotificationTemplates::render(&self.templates.voicemail_saved, caller, "", recording)
    }

    fn notification_template(&self, resolution: Resolution) -> Option<&str> {
        let templates = &self.templates;
        let template = match resolution {
            Resolution::Clarify => return None,
            Resolution::Transfer => &templates.urgent_transfer,
            Resolution::TransferAfterClarification => &templates.urgent_transfer_after_clarification,
            Resolution::Voicemail => &templates.voicemail,
            Resolution::VoicemailAfterClarification => &templates.voicemail_after_clarification,
            Resolution::VoicemailLowConfidence => &templates.voicemail_low_confidence,
        };
        Some(template)
    }

    fn summarize(&self, template: &str, context: &CallContext) -> String {
        let transcript = context.transcript_summary();
        let transcript = if transcript.is_empty() { "-" } else { transcript.as_str() };
        NotificationTemplates::render(template, context.caller_label(), transcript, "")
    }
}
