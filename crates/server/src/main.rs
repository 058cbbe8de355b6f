//! Call Filter Server Entry Point

use anyhow::Context;
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use call_filter_config::{load_settings, Settings};
use call_filter_server::{create_router, init_metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Priority: env vars > config/{env}.yaml > config/default.yaml > defaults
    let env = std::env::var("CALL_FILTER_ENV").ok();
    let (settings, load_error) = match load_settings(env.as_deref()) {
        Ok(settings) => (settings, None),
        Err(e) => (Settings::default(), Some(e)),
    };

    init_tracing(&settings);

    if let Some(e) = load_error {
        tracing::warn!(error = %e, "Failed to load configuration, using defaults");
    }

    tracing::info!("Starting Call Filter v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        environment = ?settings.environment,
        config_env = env.as_deref().unwrap_or("default"),
        "Configuration loaded"
    );

    if settings.observability.metrics_enabled {
        match init_metrics() {
            Ok(_) => tracing::info!("Initialized Prometheus metrics at /metrics"),
            Err(e) => tracing::warn!(error = %e, "Prometheus recorder not installed"),
        }
    }

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid listen address {}:{}",
                settings.server.host, settings.server.port
            )
        })?;

    if settings.telephony.forward_number().is_none() {
        tracing::warn!("No forward number configured; urgent calls will be sent to voicemail");
    }

    let state = AppState::new(settings).context("failed to build application state")?;
    tracing::info!(
        classifier = state.classifier().name(),
        notifier = state.dispatcher.channel(),
        "Initialized application state"
    );

    let app = create_router(state);

    tracing::info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown...");
        }
    }
}

fn env_filter(config: &Settings) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.observability.log_level;
        format!("call_filter={},tower_http=debug", level).into()
    })
}

/// Initialize tracing (with optional OpenTelemetry when feature enabled)
#[cfg(feature = "telemetry")]
fn init_tracing(config: &Settings) {
    use opentelemetry::trace::TracerProvider as _;
    use opentelemetry_otlp::WithExportConfig;

    let subscriber = tracing_subscriber::registry().with(env_filter(config));
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    if let Some(otlp_endpoint) = &config.observability.otlp_endpoint {
        if config.observability.tracing_enabled {
            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(otlp_endpoint)
                .build();
            match exporter {
                Ok(exporter) => {
                    let provider = opentelemetry_sdk::trace::TracerProvider::builder()
                        .with_batch_exporter(exporter, opentelemetry_sdk::runtime::Tokio)
                        .with_resource(opentelemetry_sdk::Resource::new(vec![
                            opentelemetry::KeyValue::new("service.name", "call-filter"),
                            opentelemetry::KeyValue::new(
                                "service.version",
                                env!("CARGO_PKG_VERSION"),
                            ),
                        ]))
                        .build();
                    let tracer = provider.tracer("call-filter");
                    opentelemetry::global::set_tracer_provider(provider);

                    let otel_layer = tracing_opentelemetry::layer().with_tracer(tracer);
                    subscriber.with(fmt_layer).with(otel_layer).init();
                    tracing::info!(endpoint = %otlp_endpoint, "OpenTelemetry tracing enabled");
                    return;
                }
                Err(e) => eprintln!("Failed to initialize OpenTelemetry: {}. Falling back.", e),
            }
        }
    }
    subscriber.with(fmt_layer).init();
}

/// Initialize tracing (console only - telemetry feature disabled)
#[cfg(not(feature = "telemetry"))]
fn init_tracing(config: &Settings) {
    let subscriber = tracing_subscriber::registry().with(env_filter(config));
    let fmt_layer = if config.observability.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    subscriber.with(fmt_layer).init();
}
