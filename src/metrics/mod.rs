//! Prometheus metrics for signal generation, alert gating and the HTTP API

use prometheus::{
    Encoder, Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry,
    TextEncoder,
};

pub struct Metrics {
    registry: Registry,

    pub signals_generated: IntCounter,
    pub signals_rejected_by_threshold: IntCounter,
    pub signals_rejected_by_rate_limit: IntCounter,
    pub alerts_dispatched: IntCounter,
    pub alerts_failed: IntCounter,
    pub assets_skipped: IntCounter,

    pub tier_firings_total: IntCounterVec,
    pub tier_overruns_total: IntCounterVec,
    pub tier_firing_duration_seconds: Histogram,

    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: Gauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let signals_generated = IntCounter::new(
            "signals_generated_total",
            "Trading signals produced by the generator",
        )?;
        let signals_rejected_by_threshold = IntCounter::new(
            "signals_rejected_by_threshold_total",
            "Signals rejected for confidence or strength below the alert gate",
        )?;
        let signals_rejected_by_rate_limit = IntCounter::new(
            "signals_rejected_by_rate_limit_total",
            "Signals rejected because the asset was cooling down",
        )?;
        let alerts_dispatched = IntCounter::new(
            "alerts_dispatched_total",
            "Accepted alerts delivered successfully",
        )?;
        let alerts_failed =
            IntCounter::new("alerts_failed_total", "Accepted alerts whose delivery failed")?;
        let assets_skipped = IntCounter::new(
            "assets_skipped_total",
            "Per-asset evaluations skipped because of an error",
        )?;

        let tier_firings_total = IntCounterVec::new(
            Opts::new("tier_firings_total", "Completed tier firings"),
            &["tier"],
        )?;
        let tier_overruns_total = IntCounterVec::new(
            Opts::new(
                "tier_overruns_total",
                "Tier firings that took longer than the tier interval",
            ),
            &["tier"],
        )?;
        let tier_firing_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "tier_firing_duration_seconds",
                "Wall time of one tier firing",
            )
            .buckets(vec![0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 300.0, 900.0]),
        )?;

        let http_requests_total =
            IntCounter::new("http_requests_total", "Total HTTP requests served")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency",
        ))?;
        let http_requests_in_flight =
            Gauge::new("http_requests_in_flight", "HTTP requests currently in flight")?;

        registry.register(Box::new(signals_generated.clone()))?;
        registry.register(Box::new(signals_rejected_by_threshold.clone()))?;
        registry.register(Box::new(signals_rejected_by_rate_limit.clone()))?;
        registry.register(Box::new(alerts_dispatched.clone()))?;
        registry.register(Box::new(alerts_failed.clone()))?;
        registry.register(Box::new(assets_skipped.clone()))?;
        registry.register(Box::new(tier_firings_total.clone()))?;
        registry.register(Box::new(tier_overruns_total.clone()))?;
        registry.register(Box::new(tier_firing_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;

        Ok(Self {
            registry,
            signals_generated,
            signals_rejected_by_threshold,
            signals_rejected_by_rate_limit,
            alerts_dispatched,
            alerts_failed,
            assets_skipped,
            tier_firings_total,
            tier_overruns_total,
            tier_firing_duration_seconds,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
        })
    }

    /// Render all metrics in the Prometheus text exposition format.
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
