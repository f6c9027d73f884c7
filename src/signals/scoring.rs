//! Percentile scoring, momentum and position sizing
//!
//! Pure functions with no I/O so each rule can be tested in isolation.

use crate::models::{SignalDirection, SignalStrength};

/// Percentile cut points (0-100) that map a volatility percentile to a
/// signal strength.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrengthBands {
    /// Below this percentile no signal is produced
    pub historical: f64,
    /// WEAK below, MODERATE at or above
    pub moderate: f64,
    /// STRONG at or above
    pub extreme: f64,
}

impl Default for StrengthBands {
    fn default() -> Self {
        Self {
            historical: 85.0,
            moderate: 90.0,
            extreme: 95.0,
        }
    }
}

/// Step function from volatility percentile to strength.
pub fn classify_strength(percentile: f64, bands: &StrengthBands) -> Option<SignalStrength> {
    if percentile >= bands.extreme {
        Some(SignalStrength::Strong)
    } else if percentile >= bands.moderate {
        Some(SignalStrength::Moderate)
    } else if percentile >= bands.historical {
        Some(SignalStrength::Weak)
    } else {
        None
    }
}

/// Confidence grows monotonically with the percentile, bounded to [0, 1].
pub fn confidence_from_percentile(percentile: f64) -> f64 {
    if percentile.is_nan() {
        return 0.0;
    }
    (percentile / 100.0).clamp(0.0, 1.0)
}

/// Score a percentile into (strength, confidence), `None` below the
/// historical band.
pub fn score_percentile(percentile: f64, bands: &StrengthBands) -> Option<(SignalStrength, f64)> {
    classify_strength(percentile, bands).map(|s| (s, confidence_from_percentile(percentile)))
}

/// Simple return from the price `lookback` points before the end of
/// `prices` to `current_price`.
pub fn momentum(prices: &[f64], current_price: f64, lookback: usize) -> Option<f64> {
    if prices.is_empty() {
        return None;
    }
    let idx = prices.len() - 1 - lookback.min(prices.len() - 1);
    let reference = prices[idx];
    if reference <= 0.0 {
        return None;
    }
    Some(current_price / reference - 1.0)
}

/// Direction from the sign of momentum; moves inside the deadband are NEUTRAL.
pub fn direction_from_momentum(momentum: f64, deadband: f64) -> SignalDirection {
    if momentum > deadband {
        SignalDirection::Long
    } else if momentum < -deadband {
        SignalDirection::Short
    } else {
        SignalDirection::Neutral
    }
}

/// Volatility-targeted position size: `max_fraction * target / current`,
/// never above `max_fraction`.
pub fn position_size(current_volatility: f64, target_volatility: f64, max_fraction: f64) -> f64 {
    if current_volatility <= 0.0 || !current_volatility.is_finite() {
        return max_fraction;
    }
    let scale = (target_volatility / current_volatility).clamp(0.0, 1.0);
    max_fraction * scale
}
