//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use voltrix::alerts::{AlertDispatcher, AlertFilter, AlertStateStore, ThresholdConfig};
use voltrix::core::pipeline::SignalPipeline;
use voltrix::error::{DispatchError, MarketDataError};
use voltrix::indicators::volatility::{AnalyzerSettings, VolatilityAnalyzer};
use voltrix::metrics::Metrics;
use voltrix::models::{PricePoint, TradingSignal, VolatilityMetrics};
use voltrix::services::{InMemoryMarketData, MarketDataProvider};
use voltrix::signals::{AnalysisWindow, GeneratorSettings, SignalEngine, SignalGenerator};

pub const WINDOW: usize = 15;
pub const HISTORICAL_DAYS: usize = 30;
pub const LOOKBACK_DAYS: u32 = 50;

/// Daily points for `prices`, the last one an hour before now.
pub fn daily_series(prices: &[f64]) -> Vec<PricePoint> {
    let end = Utc::now() - ChronoDuration::hours(1);
    let n = prices.len() as i64;
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| PricePoint::new(end - ChronoDuration::days(n - 1 - i as i64), *p))
        .collect()
}

fn compound(returns: &[f64]) -> Vec<f64> {
    let mut price = 100.0;
    let mut prices = vec![price];
    for r in returns {
        price *= 1.0 + r;
        prices.push(price);
    }
    prices
}

/// 35 calm days, then 10 days swinging +12% / -4%: a LONG volatility
/// breakout on the last day.
pub fn breakout_series() -> Vec<PricePoint> {
    let mut returns: Vec<f64> = (0..34)
        .map(|i| if i % 2 == 0 { 0.005 } else { -0.005 })
        .collect();
    returns.extend((0..10).map(|i| if i % 2 == 0 { 0.12 } else { -0.04 }));
    daily_series(&compound(&returns))
}

/// Swings that shrink every day: the latest volatility is the lowest.
pub fn cooling_series() -> Vec<PricePoint> {
    let returns: Vec<f64> = (0..44)
        .map(|i| {
            let amplitude = 0.05 * 0.95f64.powi(i);
            if i % 2 == 0 {
                amplitude
            } else {
                -amplitude
            }
        })
        .collect();
    daily_series(&compound(&returns))
}

pub fn short_series(days: usize) -> Vec<PricePoint> {
    daily_series(&vec![100.0; days])
}

/// Records every dispatched signal.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub sent: Mutex<Vec<TradingSignal>>,
}

impl RecordingDispatcher {
    pub async fn count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl AlertDispatcher for RecordingDispatcher {
    fn name(&self) -> &str {
        "recording"
    }

    async fn dispatch(
        &self,
        signal: &TradingSignal,
        _metrics: &VolatilityMetrics,
    ) -> Result<(), DispatchError> {
        self.sent.lock().await.push(signal.clone());
        Ok(())
    }
}

/// Always fails as if the endpoint returned 500.
pub struct FailingDispatcher;

#[async_trait]
impl AlertDispatcher for FailingDispatcher {
    fn name(&self) -> &str {
        "failing"
    }

    async fn dispatch(
        &self,
        _signal: &TradingSignal,
        _metrics: &VolatilityMetrics,
    ) -> Result<(), DispatchError> {
        Err(DispatchError::Status {
            status: 500,
            body: "internal error".to_string(),
        })
    }
}

/// Delays every history fetch.
pub struct SlowProvider {
    pub inner: Arc<InMemoryMarketData>,
    pub delay: Duration,
}

#[async_trait]
impl MarketDataProvider for SlowProvider {
    async fn price_history(
        &self,
        asset: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        tokio::time::sleep(self.delay).await;
        self.inner.price_history(asset, from, to).await
    }

    async fn current_price(&self, asset: &str) -> Result<Option<f64>, MarketDataError> {
        self.inner.current_price(asset).await
    }
}

/// Provider preloaded with a breakout for `bitcoin` and `ethereum`.
pub async fn breakout_provider() -> Arc<InMemoryMarketData> {
    let provider = Arc::new(InMemoryMarketData::new());
    provider.insert_series("bitcoin", breakout_series()).await;
    provider.insert_series("ethereum", breakout_series()).await;
    provider
}

pub fn build_pipeline(
    provider: Arc<dyn MarketDataProvider>,
    dispatcher: Arc<dyn AlertDispatcher>,
    metrics: Arc<Metrics>,
) -> SignalPipeline {
    let analyzer = VolatilityAnalyzer::new(AnalyzerSettings::default()).expect("analyzer");
    let generator = SignalGenerator::new(GeneratorSettings::default());
    let engine = Arc::new(SignalEngine::new(
        provider,
        analyzer,
        generator,
        AnalysisWindow {
            window: WINDOW,
            historical_days: HISTORICAL_DAYS,
        },
    ));
    let filter = Arc::new(AlertFilter::new(
        ThresholdConfig::default(),
        Arc::new(AlertStateStore::new()),
    ));

    SignalPipeline::new(engine, filter, dispatcher, metrics, LOOKBACK_DAYS).with_concurrency(4)
}

pub fn assets(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}
