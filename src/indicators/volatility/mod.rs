//! Volatility indicators: rolling realized volatility and its historical distribution

pub mod analyzer;

pub use analyzer::*;
