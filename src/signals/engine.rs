//! Per-asset evaluation: fetch history, analyze volatility, generate signals.

use crate::error::EvaluationError;
use crate::indicators::volatility::VolatilityAnalyzer;
use crate::models::{normalize_series, TradingSignal, VolatilityMetrics};
use crate::services::market_data::MarketDataProvider;
use crate::signals::signal_generator::SignalGenerator;
use chrono::{TimeDelta, Utc};
use std::sync::Arc;
use tracing::debug;

/// Windowing used for every analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    pub window: usize,
    pub historical_days: usize,
}

/// Outcome of evaluating one asset.
#[derive(Debug, Clone)]
pub struct AssetEvaluation {
    pub asset: String,
    pub metrics: VolatilityMetrics,
    pub signals: Vec<TradingSignal>,
}

pub struct SignalEngine {
    provider: Arc<dyn MarketDataProvider>,
    analyzer: VolatilityAnalyzer,
    generator: SignalGenerator,
    window: AnalysisWindow,
}

impl SignalEngine {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        analyzer: VolatilityAnalyzer,
        generator: SignalGenerator,
        window: AnalysisWindow,
    ) -> Self {
        Self {
            provider,
            analyzer,
            generator,
            window,
        }
    }

    pub fn window(&self) -> AnalysisWindow {
        self.window
    }

    /// Evaluate `asset` over the last `lookback_days` of history.
    ///
    /// Suspends only on the data fetch; analysis and generation are pure.
    pub async fn evaluate(
        &self,
        asset: &str,
        lookback_days: u32,
    ) -> Result<AssetEvaluation, EvaluationError> {
        let to = Utc::now();
        let from = TimeDelta::try_days(i64::from(lookback_days))
            .and_then(|span| to.checked_sub_signed(span))
            .ok_or_else(|| EvaluationError::LookbackOutOfRange {
                asset: asset.to_string(),
                lookback_days,
            })?;

        let series = self
            .provider
            .price_history(asset, from, to)
            .await
            .map_err(|source| EvaluationError::MarketData {
                asset: asset.to_string(),
                source,
            })?;
        let series = normalize_series(series);

        let metrics = self
            .analyzer
            .analyze(&series, self.window.window, self.window.historical_days)
            .map_err(|source| EvaluationError::Analysis {
                asset: asset.to_string(),
                source,
            })?;

        let current_price = self
            .provider
            .current_price(asset)
            .await
            .map_err(|source| EvaluationError::MarketData {
                asset: asset.to_string(),
                source,
            })?;

        let signals = self
            .generator
            .generate(asset, &series, &metrics, current_price)
            .map_err(|source| EvaluationError::Signal {
                asset: asset.to_string(),
                source,
            })?;

        debug!(
            asset = %asset,
            points = series.len(),
            volatility = metrics.current_volatility,
            threshold = metrics.historical_threshold,
            percentile = metrics.volatility_percentile,
            signals = signals.len(),
            "SignalEngine: evaluated {} ({} signals)",
            asset,
            signals.len()
        );

        Ok(AssetEvaluation {
            asset: asset.to_string(),
            metrics,
            signals,
        })
    }
}
