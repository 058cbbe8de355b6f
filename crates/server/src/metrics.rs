//! Observability Metrics
//!
//! Prometheus metrics exposed at `/metrics`.

use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use std::time::Duration;

use call_filter_core::{Classification, RoutingAction, VerdictSource};

/// Global Prometheus handle
static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Install the Prometheus recorder
///
/// Call once at startup; later calls return the same handle.
pub fn init_metrics() -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    METRICS_HANDLE
        .get_or_try_init(|| {
            let handle = PrometheusBuilder::new().install_recorder()?;
            register_default_metrics();
            Ok(handle)
        })
        .cloned()
}

/// Get the global metrics handle
pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

fn register_default_metrics() {
    for endpoint in ["answer", "process_gather", "process_clarify", "voicemail_saved", "analyze"] {
        counter!("call_filter_webhook_requests_total", "endpoint" => endpoint).absolute(0);
    }
    for action in [
        RoutingAction::GatherSpeech,
        RoutingAction::AskClarifyingQuestion,
        RoutingAction::Transfer,
        RoutingAction::RecordVoicemail,
        RoutingAction::Terminate,
    ] {
        counter!("call_filter_routing_decisions_total", "action" => action.as_str()).absolute(0);
    }
}

/// Record an inbound request
pub fn record_request(endpoint: &'static str) {
    counter!("call_filter_webhook_requests_total", "endpoint" => endpoint).increment(1);
}

/// Record a routing decision
pub fn record_decision(action: RoutingAction) {
    counter!("call_filter_routing_decisions_total", "action" => action.as_str()).increment(1);
}

/// Record a recovered error by category
pub fn record_error(category: &'static str) {
    counter!("call_filter_errors_total", "category" => category).increment(1);
}

/// Record a classification, and its latency when the classifier was consulted
pub fn record_classification(classification: &Classification, elapsed: Duration) {
    counter!(
        "call_filter_classifications_total",
        "label" => classification.verdict.label.as_str(),
        "source" => classification.source.as_str()
    )
    .increment(1);

    if let VerdictSource::Fallback(cause) = classification.source {
        counter!("call_filter_classifier_fallbacks_total", "cause" => cause.as_str()).increment(1);
    }

    if classification.source != VerdictSource::EmptyTranscript {
        histogram!("call_filter_classifier_duration_seconds").record(elapsed.as_secs_f64());
    }
}

/// Metrics endpoint handler
///
/// Returns Prometheus-formatted metrics.
pub async fn metrics_handler() -> impl IntoResponse {
    match get_metrics_handle() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}
