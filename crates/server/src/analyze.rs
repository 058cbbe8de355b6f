//! Synchronous urgency analysis

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use call_filter_core::UrgencyLabel;

use crate::metrics::{record_classification, record_request};
use crate::state::AppState;
use crate::ServerError;

#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default, alias = "phoneNumber")]
    pub caller_id: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub label: UrgencyLabel,
    pub confidence: f32,
    pub reason: String,
    pub clarify_question: Option<String>,
    /// `model`, `fallback` or `empty_transcript`
    pub source: &'static str,
    /// True when the model could not be used
    pub degraded: bool,
}

/// POST /api/analyze
pub async fn analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    record_request("analyze");
    let Json(request) = payload.map_err(|e| ServerError::InvalidRequest(e.body_text()))?;

    let transcript = request
        .transcript
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ServerError::InvalidRequest("transcript required".to_string()))?;

    let context = request
        .context
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| {
            let caller = request
                .caller_id
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .unwrap_or("unknown");
            format!("from:{}", caller)
        });

    let started = Instant::now();
    let classification = state.classifier().classify(transcript, &context).await;
    record_classification(&classification, started.elapsed());

    Ok(Json(AnalyzeResponse {
        label: classification.verdict.label,
        confidence: classification.verdict.confidence,
        degraded: classification.is_degraded(),
        source: classification.source.as_str(),
        reason: classification.verdict.reason,
        clarify_question: classification.verdict.clarify_question,
    }))
}
