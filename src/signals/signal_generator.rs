use crate::error::SignalError;
use crate::models::{PricePoint, SignalStrength, TradingSignal, VolatilityMetrics};
use crate::signals::scoring::{self, StrengthBands};
use chrono::Utc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneratorSettings {
    pub bands: StrengthBands,
    /// Points back from the latest observation used for momentum
    pub momentum_lookback: usize,
    /// Absolute momentum below which direction is NEUTRAL
    pub momentum_deadband: f64,
    /// Upper bound for the position-size hint (fraction of capital)
    pub max_position_fraction: f64,
    /// Annualized volatility at which the full `max_position_fraction` is used
    pub target_volatility: f64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            bands: StrengthBands::default(),
            momentum_lookback: 5,
            momentum_deadband: 0.001,
            max_position_fraction: 0.1,
            target_volatility: 0.6,
        }
    }
}

pub struct SignalGenerator {
    settings: GeneratorSettings,
}

impl SignalGenerator {
    pub fn new(settings: GeneratorSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Turn a volatility snapshot into zero or more signals for `asset`.
    ///
    /// A signal is produced only while current volatility is above the
    /// historical threshold. Fails with [`SignalError::InvalidPrice`] when
    /// the current price is missing, non-finite or non-positive.
    pub fn generate(
        &self,
        asset: &str,
        series: &[PricePoint],
        metrics: &VolatilityMetrics,
        current_price: Option<f64>,
    ) -> Result<Vec<TradingSignal>, SignalError> {
        let price = match current_price {
            Some(p) if p.is_finite() && p > 0.0 => p,
            other => return Err(SignalError::InvalidPrice { price: other }),
        };

        if metrics.current_volatility <= metrics.historical_threshold {
            return Ok(Vec::new());
        }

        let percentile = metrics.volatility_percentile;
        let breakout = metrics.current_volatility >= metrics.extreme_threshold;

        let (mut strength, confidence) = scoring::score_percentile(percentile, &self.settings.bands)
            .unwrap_or((
                SignalStrength::Weak,
                scoring::confidence_from_percentile(percentile),
            ));
        if breakout {
            strength = SignalStrength::Strong;
        } else if strength == SignalStrength::Strong {
            strength = SignalStrength::Moderate;
        }

        let prices: Vec<f64> = series.iter().map(|p| p.price).collect();
        let momentum =
            scoring::momentum(&prices, price, self.settings.momentum_lookback).unwrap_or(0.0);
        let direction = scoring::direction_from_momentum(momentum, self.settings.momentum_deadband);

        let position_size = scoring::position_size(
            metrics.current_volatility,
            self.settings.target_volatility,
            self.settings.max_position_fraction,
        );

        let kind = if breakout {
            "Volatility breakout"
        } else {
            "Elevated volatility"
        };
        let threshold = if breakout {
            metrics.extreme_threshold
        } else {
            metrics.historical_threshold
        };
        let reason = format!(
            "{}: {:.1}% annualized vol above {:.1}% threshold ({:.1}th percentile); momentum {:+.2}% over {} periods",
            kind,
            metrics.current_volatility * 100.0,
            threshold * 100.0,
            percentile,
            momentum * 100.0,
            self.settings.momentum_lookback
        );

        Ok(vec![TradingSignal {
            asset: asset.to_string(),
            direction,
            price,
            strength,
            confidence,
            position_size,
            reason,
            generated_at: Utc::now(),
        }])
    }
}
