//! HTTP Endpoints

use axum::{
    extract::State,
    http::{HeaderValue, Method, StatusCode},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::analyze::analyze;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use crate::webhooks;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let server = &state.settings.server;
    let cors_layer = build_cors_layer(&server.cors_origins, server.cors_enabled);
    let timeout = server.timeout();

    Router::new()
        // Carrier webhooks
        .route("/answer", post(webhooks::answer))
        .route("/process_gather", post(webhooks::process_gather))
        .route("/process_clarify", post(webhooks::process_clarify))
        .route("/voicemail_saved", post(webhooks::voicemail_saved))
        .route("/calls/:stage", post(webhooks::stage_event))
        // Synchronous analysis
        .route("/api/analyze", post(analyze))
        .route("/analyze", post(analyze))
        // Health check
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build CORS layer from configured origins
///
/// - If cors_enabled is false, returns permissive layer (for dev)
/// - If no configured origin parses, only same-origin requests succeed
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if !origins.is_empty() && parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid");
    }

    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// Liveness probe
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Readiness probe
///
/// Not ready without a forward number, since urgent calls could not be
/// bridged. A missing classifier key only degrades verdicts to the keyword
/// heuristic.
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let settings = &state.settings;
    let forward_ok = settings.telephony.forward_number().is_some();
    let classifier_ok = settings.classifier.api_key().is_some();

    let checks = serde_json::json!({
        "classifier": {
            "status": if classifier_ok { "ok" } else { "degraded" },
            "name": state.classifier().name(),
            "model": settings.classifier.model,
        },
        "transfer": {
            "status": if forward_ok { "ok" } else { "missing_forward_number" },
        },
        "notifier": {
            "status": "ok",
            "channel": state.dispatcher.channel(),
        },
    });

    let (status, code) = if forward_ok {
        ("ready", StatusCode::OK)
    } else {
        ("not_ready", StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        code,
        Json(serde_json::json!({
            "status": status,
            "checks": checks,
        })),
    )
}
