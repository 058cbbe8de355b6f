//! Carrier webhooks
//!
//! Each handler rebuilds the call context from the endpoint it was reached
//! on and the form payload, runs one step of the triage machine, dispatches
//! the operator notification in the background, and answers with call-control
//! markup. The carrier routes the next event to the endpoint named in that
//! markup.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Form,
};
use serde::Deserialize;
use std::time::Instant;

use call_filter_core::{CallContext, RoutingDecision, Stage};

use crate::metrics::{record_classification, record_decision, record_error, record_request};
use crate::state::AppState;
use crate::twiml::{render_decision, VoiceResponse};

/// Speech gather result
#[derive(Debug, Default, Deserialize)]
pub struct SpeechEvent {
    #[serde(rename = "SpeechResult", default)]
    pub speech_result: String,
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "CallSid", default)]
    pub call_sid: Option<String>,
}

/// Incoming call
#[derive(Debug, Default, Deserialize)]
pub struct CallEvent {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "CallSid", default)]
    pub call_sid: Option<String>,
}

/// Voicemail recording completed
#[derive(Debug, Default, Deserialize)]
pub struct RecordingEvent {
    #[serde(rename = "RecordingUrl", default)]
    pub recording_url: String,
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "CallSid", default)]
    pub call_sid: Option<String>,
}

/// POST /answer
pub async fn answer(State(state): State<AppState>, Form(event): Form<CallEvent>) -> VoiceResponse {
    record_request("answer");
    tracing::info!(
        caller_id = %event.from,
        call_sid = event.call_sid.as_deref().unwrap_or(""),
        "Incoming call"
    );
    respond(&state, state.machine.greet())
}

/// POST /process_gather
pub async fn process_gather(
    State(state): State<AppState>,
    Form(event): Form<SpeechEvent>,
) -> VoiceResponse {
    record_request("process_gather");
    handle_speech(&state, Stage::AwaitingInitialSpeech, event).await
}

/// POST /process_clarify
pub async fn process_clarify(
    State(state): State<AppState>,
    Form(event): Form<SpeechEvent>,
) -> VoiceResponse {
    record_request("process_clarify");
    handle_speech(&state, Stage::AwaitingClarification, event).await
}

/// POST /calls/:stage
///
/// Speech event for a stage named in the path. Stage names the machine does
/// not know still end in voicemail.
pub async fn stage_event(
    State(state): State<AppState>,
    Path(stage): Path<String>,
    Form(event): Form<SpeechEvent>,
) -> VoiceResponse {
    record_request("calls");
    match stage.parse::<Stage>() {
        Ok(stage) => handle_speech(&state, stage, event).await,
        Err(e) => {
            record_error(e.category());
            let context =
                CallContext::new(event.from, Stage::Resolved).with_call_sid(event.call_sid);
            respond(&state, state.machine.unexpected_stage(&context, &stage))
        }
    }
}

/// POST /voicemail_saved
pub async fn voicemail_saved(
    State(state): State<AppState>,
    Form(event): Form<RecordingEvent>,
) -> impl IntoResponse {
    record_request("voicemail_saved");
    tracing::info!(
        caller_id = %event.from,
        call_sid = event.call_sid.as_deref().unwrap_or(""),
        recording = %event.recording_url,
        "Voicemail saved"
    );
    let message = state
        .machine
        .voicemail_saved_message(&event.from, &event.recording_url);
    state.notify(Some(message));
    StatusCode::NO_CONTENT
}

async fn handle_speech(state: &AppState, stage: Stage, event: SpeechEvent) -> VoiceResponse {
    let mut context = CallContext::new(event.from, stage).with_call_sid(event.call_sid);

    let started = Instant::now();
    let decision = state.machine.advance(&mut context, &event.speech_result).await;
    if let Some(classification) = &decision.classification {
        record_classification(classification, started.elapsed());
        tracing::info!(
            caller_id = %context.caller_label(),
            label = classification.verdict.label.as_str(),
            confidence = classification.verdict.confidence,
            source = classification.source.as_str(),
            "Utterance classified"
        );
    }

    respond(state, decision)
}

fn respond(state: &AppState, decision: RoutingDecision) -> VoiceResponse {
    record_decision(decision.action);
    if decision.action.resolves_call() {
        tracing::info!(action = decision.action.as_str(), "Call resolved");
    }
    let settings = &state.settings;
    let response = render_decision(
        &decision,
        &settings.triage,
        &settings.server,
        &settings.telephony,
    );
    state.notify(decision.notify_message);
    response
}
