//! Voltrix: volatility-driven trading signals with rate-limited operator alerts.
//!
//! Pipeline: a tier timer fires, history is fetched per asset, volatility is
//! analyzed, signals are generated, gated by the alert filter and dispatched.

pub mod alerts;
pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod signals;
