//! Error types for the signal and alerting pipeline

use thiserror::Error;

/// Failures of the volatility analyzer.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("insufficient data: {available} price points, {required} required")]
    InsufficientData { required: usize, available: usize },

    #[error("invalid volatility window {window}: at least 2 returns are needed")]
    InvalidWindow { window: usize },

    #[error("invalid percentiles: historical {historical} must not exceed extreme {extreme}")]
    InvalidPercentiles { historical: f64, extreme: f64 },

    #[error("price series is not strictly chronological at index {index}")]
    UnorderedSeries { index: usize },

    #[error("non-positive or non-finite price at index {index}")]
    NonPositivePrice { index: usize },
}

/// Failures of the signal generator.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SignalError {
    #[error("invalid current price: {price:?}")]
    InvalidPrice { price: Option<f64> },
}

/// Failures of the market data layer.
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("market data API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode market data: {0}")]
    Decode(String),

    #[error("unknown asset: {0}")]
    UnknownAsset(String),
}

/// Per-asset evaluation failure. Caught at the firing boundary: the asset is
/// skipped for the cycle and the remaining assets proceed.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("{asset}: {source}")]
    Analysis {
        asset: String,
        #[source]
        source: AnalysisError,
    },

    #[error("{asset}: {source}")]
    Signal {
        asset: String,
        #[source]
        source: SignalError,
    },

    #[error("{asset}: {source}")]
    MarketData {
        asset: String,
        #[source]
        source: MarketDataError,
    },

    #[error("{asset}: lookback of {lookback_days} days is out of range")]
    LookbackOutOfRange { asset: String, lookback_days: u32 },
}

impl EvaluationError {
    pub fn asset(&self) -> &str {
        match self {
            Self::Analysis { asset, .. }
            | Self::Signal { asset, .. }
            | Self::MarketData { asset, .. }
            | Self::LookbackOutOfRange { asset, .. } => asset,
        }
    }

    /// Short machine-readable label for logs and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Analysis {
                source: AnalysisError::InsufficientData { .. },
                ..
            } => "insufficient-data",
            Self::Analysis { .. } => "analysis",
            Self::Signal { .. } => "invalid-price",
            Self::MarketData { .. } => "market-data",
            Self::LookbackOutOfRange { .. } => "invalid-lookback",
        }
    }
}

/// Failures delivering an accepted alert.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
}

impl DispatchError {
    /// Transport errors, 5xx and 429 are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(e) => !e.is_builder(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
        }
    }
}

/// Malformed configuration. The only fatal error class, raised at startup.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("invalid tier definition {definition:?}: {reason}")]
    InvalidTier { definition: String, reason: String },
}

/// Invalid scheduler setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchedulerError {
    #[error("no tiers configured")]
    NoTiers,

    #[error("tier {tier} has a zero interval")]
    ZeroInterval { tier: String },

    #[error("tier {tier} has no assets")]
    EmptyTier { tier: String },

    #[error("scheduler is already running")]
    AlreadyRunning,
}
