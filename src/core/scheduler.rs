//! Tier scheduler: one cooperative periodic task per tier
//!
//! Each tick runs one bounded firing to completion before the task waits
//! again. A firing that outlasts the interval delays the next tick instead of
//! skipping it, and is reported as an overrun. Stopping lets the in-flight
//! firing finish.

use crate::config::TierConfig;
use crate::core::pipeline::SignalPipeline;
use crate::error::SchedulerError;
use crate::metrics::Metrics;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

pub struct TierScheduler {
    pipeline: Arc<SignalPipeline>,
    tiers: Vec<TierConfig>,
    metrics: Arc<Metrics>,
    shutdown: watch::Sender<bool>,
    handles: Arc<RwLock<Vec<JoinHandle<()>>>>,
}

impl TierScheduler {
    pub fn new(
        pipeline: Arc<SignalPipeline>,
        tiers: Vec<TierConfig>,
        metrics: Arc<Metrics>,
    ) -> Result<Self, SchedulerError> {
        if tiers.is_empty() {
            return Err(SchedulerError::NoTiers);
        }
        for tier in &tiers {
            if tier.interval.is_zero() {
                return Err(SchedulerError::ZeroInterval {
                    tier: tier.name.clone(),
                });
            }
            if tier.assets.is_empty() {
                return Err(SchedulerError::EmptyTier {
                    tier: tier.name.clone(),
                });
            }
        }

        for tier in &tiers {
            info!(
                tier = %tier.name,
                interval_secs = tier.interval.as_secs_f64(),
                assets = ?tier.assets,
                "TierScheduler: tier {} every {:?} for {} assets",
                tier.name,
                tier.interval,
                tier.assets.len()
            );
        }

        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            pipeline,
            tiers,
            metrics,
            shutdown,
            handles: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Spawn one task per tier. The first firing of each tier happens
    /// immediately.
    pub async fn start(&self) -> Result<(), SchedulerError> {
        let mut handles = self.handles.write().await;
        if !handles.is_empty() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.shutdown.send_replace(false);
        for tier in &self.tiers {
            let handle = tokio::spawn(run_tier(
                self.pipeline.clone(),
                tier.clone(),
                self.metrics.clone(),
                self.shutdown.subscribe(),
            ));
            handles.push(handle);
        }

        info!(tiers = self.tiers.len(), "TierScheduler: started");
        Ok(())
    }

    /// Signal every tier to stop and wait for in-flight firings to finish.
    pub async fn stop(&self) {
        self.shutdown.send_replace(true);

        let handles: Vec<JoinHandle<()>> = self.handles.write().await.drain(..).collect();
        for handle in handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "TierScheduler: tier task ended abnormally");
            }
        }
        info!("TierScheduler: stopped");
    }

    pub async fn is_running(&self) -> bool {
        !self.handles.read().await.is_empty()
    }

    pub fn tiers(&self) -> &[TierConfig] {
        &self.tiers
    }
}

async fn run_tier(
    pipeline: Arc<SignalPipeline>,
    tier: TierConfig,
    metrics: Arc<Metrics>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(tier.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
                continue;
            }
            _ = ticker.tick() => {}
        }

        if *shutdown.borrow() {
            break;
        }

        let report = pipeline.run_firing(&tier.name, &tier.assets).await;
        if report.duration > tier.interval {
            metrics
                .tier_overruns_total
                .with_label_values(&[tier.name.as_str()])
                .inc();
            warn!(
                tier = %tier.name,
                duration_ms = report.duration.as_millis() as u64,
                interval_ms = tier.interval.as_millis() as u64,
                "Tier {} overran its interval; next firing is delayed",
                tier.name
            );
        }
    }

    info!(tier = %tier.name, "TierScheduler: tier {} stopped", tier.name);
}
