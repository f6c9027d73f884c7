//! Voltrix API Server
//!
//! HTTP front end for ad-hoc signal generation, health and metrics. No tier
//! scheduler runs here; use the worker for continuous evaluation.

use dotenvy::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use voltrix::config::AppConfig;
use voltrix::core::http::{start_server, AppState};
use voltrix::core::runtime::{build_pipeline, dispatcher_from_config, provider_from_config};
use voltrix::logging;
use voltrix::metrics::Metrics;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = AppConfig::from_env()?;

    info!("Starting Voltrix API Server");
    info!(environment = %config.environment, "Environment");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);

    let metrics = Arc::new(Metrics::new()?);
    let provider = provider_from_config(&config)?;
    let dispatcher = dispatcher_from_config(&config)?;
    let pipeline = Arc::new(build_pipeline(&config, provider, dispatcher, metrics.clone())?);

    let port = config.port;
    let state = AppState::new(metrics, Some(pipeline));
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("API server started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
            info!("API server stopped");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
