//! Wiring of the signal runtime from configuration

use crate::alerts::{
    AlertDispatcher, AlertFilter, AlertStateStore, DiscordWebhookDispatcher, LogDispatcher,
};
use crate::config::AppConfig;
use crate::core::pipeline::SignalPipeline;
use crate::core::scheduler::TierScheduler;
use crate::error::{AnalysisError, DispatchError, MarketDataError, SchedulerError};
use crate::indicators::volatility::VolatilityAnalyzer;
use crate::metrics::Metrics;
use crate::services::coingecko::CoinGeckoProvider;
use crate::services::market_data::MarketDataProvider;
use crate::signals::{SignalEngine, SignalGenerator};
use std::sync::Arc;
use tracing::info;

/// REST market data provider pointed at `MARKET_DATA_URL`.
pub fn provider_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn MarketDataProvider>, MarketDataError> {
    let provider =
        CoinGeckoProvider::new(config.market_data_url.clone(), config.market_data_api_key.clone())?;
    Ok(Arc::new(provider))
}

/// Discord when a webhook is configured, log-only otherwise.
pub fn dispatcher_from_config(
    config: &AppConfig,
) -> Result<Arc<dyn AlertDispatcher>, DispatchError> {
    match config.discord_webhook_url {
        Some(ref url) => {
            info!("Alerts will be delivered to Discord");
            Ok(Arc::new(DiscordWebhookDispatcher::new(
                url.clone(),
                config.discord_username.clone(),
            )?))
        }
        None => {
            info!("DISCORD_WEBHOOK_URL not set, alerts will only be logged");
            Ok(Arc::new(LogDispatcher))
        }
    }
}

/// Assemble the pipeline. The alert state store is created here and owned
/// by the filter for the process lifetime.
pub fn build_pipeline(
    config: &AppConfig,
    provider: Arc<dyn MarketDataProvider>,
    dispatcher: Arc<dyn AlertDispatcher>,
    metrics: Arc<Metrics>,
) -> Result<SignalPipeline, AnalysisError> {
    let analyzer = VolatilityAnalyzer::new(config.analyzer)?;
    let generator = SignalGenerator::new(config.generator);
    let engine = Arc::new(SignalEngine::new(provider, analyzer, generator, config.window));
    let filter = Arc::new(AlertFilter::new(
        config.thresholds,
        Arc::new(AlertStateStore::new()),
    ));

    Ok(
        SignalPipeline::new(engine, filter, dispatcher, metrics, config.lookback_days)
            .with_concurrency(config.worker_concurrency),
    )
}

/// Pipeline plus the scheduler driving it.
pub struct SignalRuntime {
    pub pipeline: Arc<SignalPipeline>,
    pub scheduler: TierScheduler,
}

impl SignalRuntime {
    pub fn new(config: &AppConfig, pipeline: Arc<SignalPipeline>) -> Result<Self, SchedulerError> {
        let scheduler = TierScheduler::new(
            pipeline.clone(),
            config.tiers.clone(),
            pipeline.metrics().clone(),
        )?;
        Ok(Self {
            pipeline,
            scheduler,
        })
    }

    pub async fn start(&self) -> Result<(), SchedulerError> {
        self.scheduler.start().await
    }

    pub async fn stop(&self) {
        self.scheduler.stop().await
    }
}
