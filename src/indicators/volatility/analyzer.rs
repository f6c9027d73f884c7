//! Rolling realized volatility and percentile thresholds
//!
//! For every trailing day in the historical range the analyzer computes the
//! annualized standard deviation of log returns over `window` returns. The
//! resulting distribution yields the historical and extreme thresholds and
//! the percentile rank of the most recent volatility.

use crate::common::math;
use crate::error::AnalysisError;
use crate::models::{PricePoint, VolatilityMetrics};

/// Percentile settings shared by every analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalyzerSettings {
    /// Percentile of the distribution used as the breakout threshold (0-100)
    pub historical_percentile: f64,
    /// Higher percentile used as the extreme threshold (0-100)
    pub extreme_percentile: f64,
    /// Periods per year used to annualize the per-period standard deviation
    pub annualization_periods: f64,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            historical_percentile: 85.0,
            extreme_percentile: 95.0,
            annualization_periods: 365.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VolatilityAnalyzer {
    settings: AnalyzerSettings,
}

impl VolatilityAnalyzer {
    pub fn new(settings: AnalyzerSettings) -> Result<Self, AnalysisError> {
        let AnalyzerSettings {
            historical_percentile: historical,
            extreme_percentile: extreme,
            ..
        } = settings;
        if !(0.0..=100.0).contains(&historical)
            || !(0.0..=100.0).contains(&extreme)
            || historical > extreme
        {
            return Err(AnalysisError::InvalidPercentiles {
                historical,
                extreme,
            });
        }
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    /// Analyze a chronological price series.
    ///
    /// Fails with [`AnalysisError::InsufficientData`] when the series is
    /// shorter than `historical_days` or than one full window of returns.
    /// The caller decides whether to skip the asset or fetch more history.
    pub fn analyze(
        &self,
        series: &[PricePoint],
        window: usize,
        historical_days: usize,
    ) -> Result<VolatilityMetrics, AnalysisError> {
        if window < 2 {
            return Err(AnalysisError::InvalidWindow { window });
        }

        let required = historical_days.max(window + 1);
        if series.len() < required {
            return Err(AnalysisError::InsufficientData {
                required,
                available: series.len(),
            });
        }

        validate_series(series)?;

        let prices: Vec<f64> = series.iter().map(|p| p.price).collect();
        let returns = math::log_returns(&prices);
        let distribution = self.rolling_volatility(&returns, window, historical_days);

        // At least one window fits because series.len() >= window + 1.
        let current_volatility = distribution.last().copied().unwrap_or_default();

        let sorted = math::sorted_copy(&distribution);
        let historical_threshold =
            math::percentile_sorted(&sorted, self.settings.historical_percentile)
                .unwrap_or_default();
        let extreme_threshold = math::percentile_sorted(&sorted, self.settings.extreme_percentile)
            .unwrap_or_default()
            .max(historical_threshold);
        let volatility_percentile =
            math::percentile_rank_sorted(&sorted, current_volatility).unwrap_or_default();

        Ok(VolatilityMetrics {
            current_volatility,
            historical_threshold,
            extreme_threshold,
            volatility_percentile,
            sample_count: distribution.len(),
        })
    }

    /// Annualized volatility for each trailing window end, oldest first,
    /// limited to the last `historical_days` values.
    fn rolling_volatility(&self, returns: &[f64], window: usize, historical_days: usize) -> Vec<f64> {
        let scale = self.settings.annualization_periods.sqrt();
        let mut vols: Vec<f64> = returns
            .windows(window)
            .filter_map(math::sample_std_dev)
            .map(|sd| sd * scale)
            .collect();

        let keep = historical_days.max(1);
        if vols.len() > keep {
            vols.drain(..vols.len() - keep);
        }
        vols
    }
}

fn validate_series(series: &[PricePoint]) -> Result<(), AnalysisError> {
    for (index, point) in series.iter().enumerate() {
        if !point.price.is_finite() || point.price <= 0.0 {
            return Err(AnalysisError::NonPositivePrice { index });
        }
        if index > 0 && point.timestamp <= series[index - 1].timestamp {
            return Err(AnalysisError::UnorderedSeries { index });
        }
    }
    Ok(())
}
