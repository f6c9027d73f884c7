//! One bounded unit of work over an asset set: evaluate, gate, dispatch.
//!
//! Per-asset failures are caught here, logged with the asset id and counted;
//! they never abort the other assets of the same run.

use crate::alerts::{AlertDispatcher, AlertFilter, FilterDecision, RejectReason};
use crate::error::EvaluationError;
use crate::metrics::Metrics;
use crate::models::{TradingSignal, VolatilityMetrics};
use crate::signals::engine::SignalEngine;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// A signal that passed the alert filter, with the metrics it came from.
#[derive(Debug, Clone, Serialize)]
pub struct AcceptedSignal {
    #[serde(flatten)]
    pub signal: TradingSignal,
    pub volatility: VolatilityMetrics,
    pub delivered: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkippedAsset {
    pub asset: String,
    pub kind: &'static str,
    pub error: String,
}

impl From<&EvaluationError> for SkippedAsset {
    fn from(e: &EvaluationError) -> Self {
        Self {
            asset: e.asset().to_string(),
            kind: e.kind(),
            error: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FiringReport {
    pub tier: String,
    pub assets: usize,
    pub evaluated: usize,
    pub generated: usize,
    pub rejected_by_threshold: usize,
    pub rejected_by_rate_limit: usize,
    pub dispatched: usize,
    pub failed: usize,
    pub accepted: Vec<AcceptedSignal>,
    pub skipped: Vec<SkippedAsset>,
    #[serde(skip)]
    pub duration: Duration,
}

#[derive(Debug, Default)]
struct AssetOutcome {
    generated: usize,
    rejected_by_threshold: usize,
    rejected_by_rate_limit: usize,
    dispatched: usize,
    failed: usize,
    accepted: Vec<AcceptedSignal>,
}

pub struct SignalPipeline {
    engine: Arc<SignalEngine>,
    filter: Arc<AlertFilter>,
    dispatcher: Arc<dyn AlertDispatcher>,
    metrics: Arc<Metrics>,
    concurrency: usize,
    lookback_days: u32,
}

impl SignalPipeline {
    pub fn new(
        engine: Arc<SignalEngine>,
        filter: Arc<AlertFilter>,
        dispatcher: Arc<dyn AlertDispatcher>,
        metrics: Arc<Metrics>,
        lookback_days: u32,
    ) -> Self {
        Self {
            engine,
            filter,
            dispatcher,
            metrics,
            concurrency: 1,
            lookback_days,
        }
    }

    /// Evaluate up to `concurrency` assets at once within a run.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn filter(&self) -> &Arc<AlertFilter> {
        &self.filter
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    pub fn lookback_days(&self) -> u32 {
        self.lookback_days
    }

    /// Scheduled firing for a tier.
    pub async fn run_firing(&self, tier: &str, assets: &[String]) -> FiringReport {
        let report = self.run(tier, assets, self.lookback_days).await;

        self.metrics
            .tier_firings_total
            .with_label_values(&[tier])
            .inc();
        self.metrics
            .tier_firing_duration_seconds
            .observe(report.duration.as_secs_f64());

        info!(
            tier = %tier,
            assets = report.assets,
            evaluated = report.evaluated,
            skipped = report.skipped.len(),
            generated = report.generated,
            accepted = report.accepted.len(),
            rejected_by_threshold = report.rejected_by_threshold,
            rejected_by_rate_limit = report.rejected_by_rate_limit,
            failed = report.failed,
            duration_ms = report.duration.as_millis() as u64,
            "Tier {} fired: {} accepted of {} generated",
            tier,
            report.accepted.len(),
            report.generated
        );
        report
    }

    /// Ad-hoc generation for an explicit asset list and lookback window.
    /// Goes through the same filter and dispatcher as scheduled firings.
    pub async fn generate(&self, assets: &[String], lookback_days: Option<u32>) -> FiringReport {
        self.run(
            "adhoc",
            assets,
            lookback_days.unwrap_or(self.lookback_days),
        )
        .await
    }

    async fn run(&self, label: &str, assets: &[String], lookback_days: u32) -> FiringReport {
        let started = Instant::now();

        let mut unique: Vec<String> = Vec::with_capacity(assets.len());
        for asset in assets {
            if !unique.contains(asset) {
                unique.push(asset.clone());
            }
        }

        let results: Vec<Result<AssetOutcome, EvaluationError>> = stream::iter(unique.clone())
            .map(|asset| async move { self.process_asset(&asset, lookback_days).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut report = FiringReport {
            tier: label.to_string(),
            assets: unique.len(),
            ..FiringReport::default()
        };

        for result in results {
            match result {
                Ok(outcome) => {
                    report.evaluated += 1;
                    report.generated += outcome.generated;
                    report.rejected_by_threshold += outcome.rejected_by_threshold;
                    report.rejected_by_rate_limit += outcome.rejected_by_rate_limit;
                    report.dispatched += outcome.dispatched;
                    report.failed += outcome.failed;
                    report.accepted.extend(outcome.accepted);
                }
                Err(e) => {
                    self.metrics.assets_skipped.inc();
                    warn!(
                        tier = %label,
                        asset = %e.asset(),
                        kind = e.kind(),
                        error = %e,
                        "Skipping {} this cycle: {}",
                        e.asset(),
                        e
                    );
                    report.skipped.push(SkippedAsset::from(&e));
                }
            }
        }

        report.duration = started.elapsed();
        report
    }

    async fn process_asset(
        &self,
        asset: &str,
        lookback_days: u32,
    ) -> Result<AssetOutcome, EvaluationError> {
        let evaluation = self.engine.evaluate(asset, lookback_days).await?;
        let mut outcome = AssetOutcome::default();

        for signal in evaluation.signals {
            self.metrics.signals_generated.inc();
            outcome.generated += 1;

            match self.filter.evaluate(&signal).await {
                FilterDecision::Rejected(RejectReason::BelowThreshold) => {
                    self.metrics.signals_rejected_by_threshold.inc();
                    outcome.rejected_by_threshold += 1;
                }
                FilterDecision::Rejected(RejectReason::RateLimited) => {
                    self.metrics.signals_rejected_by_rate_limit.inc();
                    outcome.rejected_by_rate_limit += 1;
                }
                FilterDecision::Accepted => {
                    let delivered = self.deliver(&signal, &evaluation.metrics).await;
                    if delivered {
                        outcome.dispatched += 1;
                    } else {
                        outcome.failed += 1;
                    }
                    outcome.accepted.push(AcceptedSignal {
                        signal,
                        volatility: evaluation.metrics,
                        delivered,
                    });
                }
            }
        }

        Ok(outcome)
    }

    /// Hand an accepted signal to the dispatcher. Failures are counted and
    /// logged; the cooldown stays consumed.
    async fn deliver(&self, signal: &TradingSignal, metrics: &VolatilityMetrics) -> bool {
        match self.dispatcher.dispatch(signal, metrics).await {
            Ok(()) => {
                self.metrics.alerts_dispatched.inc();
                info!(
                    asset = %signal.asset,
                    direction = %signal.direction,
                    strength = %signal.strength,
                    confidence = signal.confidence,
                    dispatcher = self.dispatcher.name(),
                    "Alert dispatched for {}",
                    signal.asset
                );
                true
            }
            Err(e) => {
                self.metrics.alerts_failed.inc();
                error!(
                    asset = %signal.asset,
                    dispatcher = self.dispatcher.name(),
                    error = %e,
                    "Alert delivery failed for {}",
                    signal.asset
                );
                false
            }
        }
    }
}
