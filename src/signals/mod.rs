//! Signal generation from volatility analysis.

pub mod engine;
pub mod scoring;
pub mod signal_generator;

pub use engine::*;
pub use scoring::*;
pub use signal_generator::*;
