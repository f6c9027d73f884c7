//! REST market data provider for CoinGecko-compatible APIs

use crate::error::MarketDataError;
use crate::models::{normalize_series, resample_daily, PricePoint};
use crate::services::market_data::MarketDataProvider;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";

#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
    #[serde(default)]
    total_volumes: Vec<(f64, f64)>,
}

pub struct CoinGeckoProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    vs_currency: String,
}

impl CoinGeckoProvider {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self::with_client(base_url, api_key, client))
    }

    pub fn with_client(
        base_url: impl Into<String>,
        api_key: Option<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
            vs_currency: "usd".to_string(),
        }
    }

    pub fn with_vs_currency(mut self, vs_currency: impl Into<String>) -> Self {
        self.vs_currency = vs_currency.into();
        self
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        asset: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let mut request = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query);
        if let Some(ref key) = self.api_key {
            request = request.header("x-cg-demo-api-key", key);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(MarketDataError::UnknownAsset(asset.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| MarketDataError::Decode(e.to_string()))
    }
}

fn millis_to_utc(ms: f64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(ms as i64).single()
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    async fn price_history(
        &self,
        asset: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let chart: MarketChart = self
            .get_json(
                asset,
                &format!("/coins/{}/market_chart/range", asset),
                &[
                    ("vs_currency", self.vs_currency.clone()),
                    ("from", from.timestamp().to_string()),
                    ("to", to.timestamp().to_string()),
                ],
            )
            .await?;

        let volumes: HashMap<i64, f64> = chart
            .total_volumes
            .iter()
            .map(|(ts, v)| (*ts as i64, *v))
            .collect();

        let points: Vec<PricePoint> = chart
            .prices
            .iter()
            .filter_map(|(ts, price)| {
                let timestamp = millis_to_utc(*ts)?;
                let mut point = PricePoint::new(timestamp, *price);
                point.volume = volumes.get(&(*ts as i64)).copied();
                Some(point)
            })
            .collect();

        let daily = resample_daily(normalize_series(points));
        debug!(
            asset = %asset,
            points = daily.len(),
            "CoinGecko: fetched {} daily points for {}",
            daily.len(),
            asset
        );
        Ok(daily)
    }

    async fn current_price(&self, asset: &str) -> Result<Option<f64>, MarketDataError> {
        let quotes: HashMap<String, HashMap<String, f64>> = self
            .get_json(
                asset,
                "/simple/price",
                &[
                    ("ids", asset.to_string()),
                    ("vs_currencies", self.vs_currency.clone()),
                ],
            )
            .await?;

        Ok(quotes
            .get(asset)
            .and_then(|q| q.get(&self.vs_currency))
            .copied())
    }
}
