//! Alert delivery
//!
//! Dispatchers own delivery retries. The filter has already consumed the
//! cooldown by the time a signal gets here, so a failed delivery is reported
//! back and never re-gated.

use crate::alerts::format::{discord_payload, format_alert_message};
use crate::error::DispatchError;
use crate::models::{TradingSignal, VolatilityMetrics};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::{info, warn};

#[async_trait]
pub trait AlertDispatcher: Send + Sync {
    fn name(&self) -> &str;

    async fn dispatch(
        &self,
        signal: &TradingSignal,
        metrics: &VolatilityMetrics,
    ) -> Result<(), DispatchError>;
}

/// Writes alerts to the log. Used when no webhook is configured.
pub struct LogDispatcher;

#[async_trait]
impl AlertDispatcher for LogDispatcher {
    fn name(&self) -> &str {
        "log"
    }

    async fn dispatch(
        &self,
        signal: &TradingSignal,
        metrics: &VolatilityMetrics,
    ) -> Result<(), DispatchError> {
        info!(
            asset = %signal.asset,
            direction = %signal.direction,
            strength = %signal.strength,
            confidence = signal.confidence,
            "ALERT {}",
            format_alert_message(signal, metrics)
        );
        Ok(())
    }
}

pub struct DiscordWebhookDispatcher {
    client: reqwest::Client,
    webhook_url: String,
    username: String,
    max_retries: usize,
    min_delay: Duration,
}

impl DiscordWebhookDispatcher {
    pub fn new(webhook_url: impl Into<String>, username: impl Into<String>) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::with_client(webhook_url, username, client))
    }

    pub fn with_client(
        webhook_url: impl Into<String>,
        username: impl Into<String>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            client,
            webhook_url: webhook_url.into(),
            username: username.into(),
            max_retries: 3,
            min_delay: Duration::from_millis(500),
        }
    }

    pub fn with_retry(mut self, max_retries: usize, min_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.min_delay = min_delay;
        self
    }

    async fn send_once(&self, payload: &serde_json::Value) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(DispatchError::Status {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl AlertDispatcher for DiscordWebhookDispatcher {
    fn name(&self) -> &str {
        "discord"
    }

    async fn dispatch(
        &self,
        signal: &TradingSignal,
        metrics: &VolatilityMetrics,
    ) -> Result<(), DispatchError> {
        let payload = discord_payload(signal, metrics, &self.username);
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_max_times(self.max_retries);

        (|| async { self.send_once(&payload).await })
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .when(|e: &DispatchError| e.is_retryable())
            .notify(|e: &DispatchError, after: Duration| {
                warn!(
                    asset = %signal.asset,
                    error = %e,
                    retry_in_ms = after.as_millis() as u64,
                    "Discord: delivery failed for {}, retrying",
                    signal.asset
                );
            })
            .await
    }
}
