//! NewsProbe server
//!
//! Serves fake news predictions from a pre-trained vectorizer and classifier
//! over HTTP, with a small demo page.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use newsprobe_server::{run_server, AppState, Cli, ServiceConfig};
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting NewsProbe");

    let config = ServiceConfig::load(&cli.config, &cli)?;
    let addr = config.listen_addr()?;
    let eager_load = config.eager_load;

    let metrics_handle = init_metrics()?;
    let state = AppState::new(config).with_metrics(metrics_handle);

    match std::env::current_dir() {
        Ok(cwd) => info!("Working directory: {}", cwd.display()),
        Err(e) => warn!("Working directory unavailable: {}", e),
    }
    info!("Model path: {}", state.paths.model.display());
    info!("Vectorizer path: {}", state.paths.vectorizer.display());

    if eager_load {
        // Detached; a failure leaves loading to the first request
        let _ = state.coordinator().spawn_eager_load();
    } else {
        info!("Eager load disabled, artifacts load on first prediction");
    }

    let shutdown = async {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
    };

    run_server(state, addr, shutdown).await
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("newsprobe_server=debug,newsprobe_classifiers=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("newsprobe_server=info,newsprobe_classifiers=info,tower_http=warn")
        })
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "newsprobe_predictions_total",
        "Successful predictions by label"
    );
    metrics::describe_counter!(
        "newsprobe_prediction_errors_total",
        "Failed predictions by error kind"
    );
    metrics::describe_counter!(
        "newsprobe_artifact_loads_total",
        "Physical artifact loads by outcome"
    );
    metrics::describe_histogram!(
        "newsprobe_prediction_latency_us",
        metrics::Unit::Microseconds,
        "Prediction latency in microseconds, including any lazy load"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
