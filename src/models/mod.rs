//! Shared data models spanning the engine layers.

pub mod market;
pub mod signal;

pub use market::{normalize_series, resample_daily, PricePoint};
pub use signal::{
    SignalDirection, SignalStrength, TradingSignal, UnknownStrength, VolatilityMetrics,
};
