//! Alert gating: conjunctive thresholds plus per-asset cooldown
//!
//! Each asset is either `Eligible` or `Cooling`. The phase is derived lazily
//! from the last accepted alert time when a candidate arrives; nothing runs
//! in the background. The check-then-set for one asset happens under that
//! asset's own lock, so concurrent candidates for the same asset are
//! serialized in arrival order while different assets never contend.

use crate::models::{SignalStrength, TradingSignal};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Gate settings, fixed for the process lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdConfig {
    pub min_confidence: f64,
    pub min_strength: SignalStrength,
    pub rate_limit_seconds: u64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.8,
            min_strength: SignalStrength::Moderate,
            rate_limit_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    BelowThreshold,
    RateLimited,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BelowThreshold => "below-threshold",
            Self::RateLimited => "rate-limited",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    Accepted,
    Rejected(RejectReason),
}

impl FilterDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPhase {
    Eligible,
    Cooling,
}

/// Per-asset cooldown state. Only the filter writes it, and only on
/// acceptance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssetAlertState {
    pub last_alert_time: Option<DateTime<Utc>>,
}

impl AssetAlertState {
    pub fn phase(&self, now: DateTime<Utc>, cooldown: TimeDelta) -> AlertPhase {
        match self.last_alert_time {
            Some(last) if now.signed_duration_since(last) < cooldown => AlertPhase::Cooling,
            _ => AlertPhase::Eligible,
        }
    }
}

/// Map from asset id to its alert state, one lock per asset.
#[derive(Default)]
pub struct AlertStateStore {
    entries: RwLock<HashMap<String, Arc<Mutex<AssetAlertState>>>>,
}

impl AlertStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn entry(&self, asset: &str) -> Arc<Mutex<AssetAlertState>> {
        if let Some(entry) = self.entries.read().await.get(asset) {
            return entry.clone();
        }
        let mut entries = self.entries.write().await;
        entries.entry(asset.to_string()).or_default().clone()
    }

    pub async fn get(&self, asset: &str) -> AssetAlertState {
        let entry = self.entries.read().await.get(asset).cloned();
        match entry {
            Some(e) => *e.lock().await,
            None => AssetAlertState::default(),
        }
    }

    /// Last accepted alert time per asset.
    pub async fn snapshot(&self) -> HashMap<String, DateTime<Utc>> {
        let entries: Vec<(String, Arc<Mutex<AssetAlertState>>)> = self
            .entries
            .read()
            .await
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut snapshot = HashMap::with_capacity(entries.len());
        for (asset, entry) in entries {
            if let Some(last) = entry.lock().await.last_alert_time {
                snapshot.insert(asset, last);
            }
        }
        snapshot
    }
}

pub struct AlertFilter {
    thresholds: ThresholdConfig,
    state: Arc<AlertStateStore>,
}

impl AlertFilter {
    pub fn new(thresholds: ThresholdConfig, state: Arc<AlertStateStore>) -> Self {
        Self { thresholds, state }
    }

    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    pub fn state(&self) -> &Arc<AlertStateStore> {
        &self.state
    }

    /// Both gates must pass. NaN confidence never passes.
    pub fn passes_thresholds(&self, signal: &TradingSignal) -> bool {
        signal.confidence >= self.thresholds.min_confidence
            && signal.strength >= self.thresholds.min_strength
    }

    /// Decide on `signal` at the current time. The clock is read once the
    /// asset lock is held, so queued candidates see non-decreasing times.
    pub async fn evaluate(&self, signal: &TradingSignal) -> FilterDecision {
        self.decide(signal, None).await
    }

    /// Decide on `signal` as if it arrived at `now`.
    pub async fn evaluate_at(&self, signal: &TradingSignal, now: DateTime<Utc>) -> FilterDecision {
        self.decide(signal, Some(now)).await
    }

    fn cooldown(&self) -> TimeDelta {
        i64::try_from(self.thresholds.rate_limit_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    async fn decide(&self, signal: &TradingSignal, at: Option<DateTime<Utc>>) -> FilterDecision {
        if !self.passes_thresholds(signal) {
            debug!(
                asset = %signal.asset,
                confidence = signal.confidence,
                strength = %signal.strength,
                "AlertFilter: {} below threshold",
                signal.asset
            );
            return FilterDecision::Rejected(RejectReason::BelowThreshold);
        }

        let cooldown = self.cooldown();
        let entry = self.state.entry(&signal.asset).await;
        let mut state = entry.lock().await;

        let now = match at {
            Some(now) => now,
            // Wall clock may step back; never record an earlier alert time.
            None => state
                .last_alert_time
                .map_or_else(Utc::now, |last| Utc::now().max(last)),
        };

        match state.phase(now, cooldown) {
            AlertPhase::Cooling => {
                debug!(
                    asset = %signal.asset,
                    last_alert = ?state.last_alert_time,
                    "AlertFilter: {} rate-limited",
                    signal.asset
                );
                FilterDecision::Rejected(RejectReason::RateLimited)
            }
            AlertPhase::Eligible => {
                state.last_alert_time = Some(now);
                FilterDecision::Accepted
            }
        }
    }
}
