//! HTTP endpoint server using Axum

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::config::MAX_LOOKBACK_DAYS;
use crate::core::pipeline::{FiringReport, SignalPipeline};
use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub pipeline: Option<Arc<SignalPipeline>>,
}

impl AppState {
    pub fn new(metrics: Arc<Metrics>, pipeline: Option<Arc<SignalPipeline>>) -> Self {
        Self {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics,
            start_time: Arc::new(Instant::now()),
            pipeline,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": "voltrix-signal-engine"
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub assets: Vec<String>,
    #[serde(default)]
    pub lookback_days: Option<u32>,
}

/// Run generation for an explicit asset list and return the accepted signals
async fn generate_signals(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<FiringReport>, (StatusCode, Json<Value>)> {
    let pipeline = state.pipeline.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "signal pipeline is not configured" })),
        )
    })?;

    let assets: Vec<String> = request
        .assets
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    if assets.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "assets must not be empty" })),
        ));
    }
    if request.lookback_days == Some(0) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "lookback_days must be positive" })),
        ));
    }
    if request.lookback_days.is_some_and(|days| days > MAX_LOOKBACK_DAYS) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": format!("lookback_days must not exceed {}", MAX_LOOKBACK_DAYS)
            })),
        ));
    }

    let report = pipeline.generate(&assets, request.lookback_days).await;
    Ok(Json(report))
}

/// Last accepted alert time per asset
async fn alert_state(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let pipeline = state
        .pipeline
        .as_ref()
        .ok_or(StatusCode::SERVICE_UNAVAILABLE)?;
    let snapshot = pipeline.filter().state().snapshot().await;
    Ok(Json(json!({
        "rate_limit_seconds": pipeline.filter().thresholds().rate_limit_seconds,
        "last_alerts": snapshot,
    })))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/signals/generate", post(generate_signals))
        .route("/api/alerts/state", get(alert_state))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(
    port: u16,
    state: AppState,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    info!(
        "Metrics endpoint available at http://0.0.0.0:{}/metrics",
        port
    );
    axum::serve(listener, app).await?;

    Ok(())
}
