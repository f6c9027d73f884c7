//! Voltrix Worker
//!
//! Runs the tier scheduler: every tier fires on its own interval, evaluates
//! its assets and dispatches accepted alerts. Also serves health, metrics and
//! ad-hoc generation on `PORT` so ad-hoc runs share the same alert state.

use dotenvy::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use voltrix::config::AppConfig;
use voltrix::core::http::{start_server, AppState};
use voltrix::core::runtime::{
    build_pipeline, dispatcher_from_config, provider_from_config, SignalRuntime,
};
use voltrix::logging;
use voltrix::metrics::Metrics;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    // Malformed thresholds are fatal here and nowhere else.
    let config = AppConfig::from_env()?;

    info!("Starting Voltrix Worker");
    info!(environment = %config.environment, "Environment");
    info!(
        min_confidence = config.thresholds.min_confidence,
        min_strength = %config.thresholds.min_strength,
        rate_limit_seconds = config.thresholds.rate_limit_seconds,
        "Alert gate: confidence >= {}, strength >= {}, cooldown {}s",
        config.thresholds.min_confidence,
        config.thresholds.min_strength,
        config.thresholds.rate_limit_seconds
    );
    info!(
        window = config.window.window,
        historical_days = config.window.historical_days,
        lookback_days = config.lookback_days,
        concurrency = config.worker_concurrency,
        "Volatility window {} over {} historical days",
        config.window.window,
        config.window.historical_days
    );

    let metrics = Arc::new(Metrics::new()?);
    let provider = provider_from_config(&config)?;
    let dispatcher = dispatcher_from_config(&config)?;
    let pipeline = Arc::new(build_pipeline(&config, provider, dispatcher, metrics.clone())?);

    let runtime = SignalRuntime::new(&config, pipeline.clone())?;
    runtime.start().await?;

    let port = config.port;
    let state = AppState::new(metrics, Some(pipeline));
    let mut server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("Worker started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down worker...");
        }
        _ = &mut server_handle => {
            error!("HTTP server stopped");
        }
    }

    runtime.stop().await;
    server_handle.abort();
    info!("Worker stopped");

    Ok(())
}
