//! Trading signal and volatility metric records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalDirection {
    Long,
    Short,
    Neutral,
}

impl fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Long => "LONG",
            Self::Short => "SHORT",
            Self::Neutral => "NEUTRAL",
        };
        f.write_str(s)
    }
}

/// Signal strength, ordered `Weak < Moderate < Strong`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalStrength {
    Weak,
    Moderate,
    Strong,
}

impl fmt::Display for SignalStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Weak => "WEAK",
            Self::Moderate => "MODERATE",
            Self::Strong => "STRONG",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrength(pub String);

impl fmt::Display for UnknownStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown signal strength {:?}", self.0)
    }
}

impl std::error::Error for UnknownStrength {}

impl FromStr for SignalStrength {
    type Err = UnknownStrength;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WEAK" => Ok(Self::Weak),
            "MODERATE" => Ok(Self::Moderate),
            "STRONG" => Ok(Self::Strong),
            _ => Err(UnknownStrength(s.to_string())),
        }
    }
}

/// Volatility snapshot for one asset at one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityMetrics {
    /// Annualized volatility over the most recent window
    pub current_volatility: f64,
    pub historical_threshold: f64,
    /// Always >= `historical_threshold`
    pub extreme_threshold: f64,
    /// Rank of `current_volatility` within the historical distribution, 0-100
    pub volatility_percentile: f64,
    /// Number of rolling-window volatilities in the historical distribution
    pub sample_count: usize,
}

/// Immutable trading signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingSignal {
    pub asset: String,
    pub direction: SignalDirection,
    pub price: f64,
    pub strength: SignalStrength,
    /// In [0, 1]
    pub confidence: f64,
    /// Suggested fraction of capital
    pub position_size: f64,
    pub reason: String,
    pub generated_at: DateTime<Utc>,
}
