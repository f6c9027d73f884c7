//! Market indicators computed from price history.

pub mod volatility;

pub use volatility::*;
