//! Market data provider interface and an in-memory implementation.

use crate::error::MarketDataError;
use crate::models::{normalize_series, PricePoint};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Chronological price history for `asset` within `[from, to]`.
    async fn price_history(
        &self,
        asset: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, MarketDataError>;

    /// Latest price for `asset`, `None` when no quote is available.
    async fn current_price(&self, asset: &str) -> Result<Option<f64>, MarketDataError>;
}

/// Provider backed by series held in memory. Used by tests and demos, and
/// by anything that already has history loaded.
#[derive(Default)]
pub struct InMemoryMarketData {
    series: RwLock<HashMap<String, Vec<PricePoint>>>,
    quotes: RwLock<HashMap<String, f64>>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the history for `asset`.
    pub async fn insert_series(&self, asset: &str, points: Vec<PricePoint>) {
        let mut series = self.series.write().await;
        series.insert(asset.to_string(), normalize_series(points));
    }

    /// Override the current quote for `asset`. Without an override the last
    /// point of the series is used.
    pub async fn set_price(&self, asset: &str, price: f64) {
        let mut quotes = self.quotes.write().await;
        quotes.insert(asset.to_string(), price);
    }
}

#[async_trait]
impl MarketDataProvider for InMemoryMarketData {
    async fn price_history(
        &self,
        asset: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let series = self.series.read().await;
        let points = series
            .get(asset)
            .ok_or_else(|| MarketDataError::UnknownAsset(asset.to_string()))?;
        Ok(points
            .iter()
            .filter(|p| p.timestamp >= from && p.timestamp <= to)
            .cloned()
            .collect())
    }

    async fn current_price(&self, asset: &str) -> Result<Option<f64>, MarketDataError> {
        if let Some(price) = self.quotes.read().await.get(asset) {
            return Ok(Some(*price));
        }
        let series = self.series.read().await;
        Ok(series
            .get(asset)
            .and_then(|points| points.last())
            .map(|p| p.price))
    }
}
