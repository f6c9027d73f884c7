//! Process-wide configuration, assembled once at startup from environment
//! variables and passed by reference afterwards. Changing it requires a
//! restart.

use crate::alerts::ThresholdConfig;
use crate::error::ConfigError;
use crate::indicators::volatility::AnalyzerSettings;
use crate::models::SignalStrength;
use crate::services::coingecko::DEFAULT_BASE_URL;
use crate::signals::{AnalysisWindow, GeneratorSettings, StrengthBands};
use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_INTERVAL_SECONDS: u64 = 3600;
pub const DEFAULT_ASSETS: &str = "bitcoin,ethereum";
/// Upper bound for `LOOKBACK_DAYS` and ad-hoc lookback requests.
pub const MAX_LOOKBACK_DAYS: u32 = 3650;
/// Upper bound for `DISCORD_RATE_LIMIT_SECONDS`; larger cooldowns do not fit
/// a chrono duration.
pub const MAX_RATE_LIMIT_SECONDS: u64 = (i64::MAX / 1000) as u64;

/// Deployment environment name (`ENVIRONMENT`, default `sandbox`).
pub fn get_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "sandbox".to_string())
}

/// An independently scheduled group of assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierConfig {
    pub name: String,
    pub interval: Duration,
    pub assets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub environment: String,
    pub port: u16,
    pub thresholds: ThresholdConfig,
    pub analyzer: AnalyzerSettings,
    pub generator: GeneratorSettings,
    pub window: AnalysisWindow,
    /// Days of history fetched per asset
    pub lookback_days: u32,
    pub signal_generation_interval: Duration,
    pub tiers: Vec<TierConfig>,
    pub worker_concurrency: usize,
    pub discord_webhook_url: Option<String>,
    pub discord_username: String,
    pub market_data_url: String,
    pub market_data_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let min_confidence: f64 = parse(&get, "DISCORD_MIN_CONFIDENCE", 0.8)?;
        if !(0.0..=1.0).contains(&min_confidence) {
            return Err(invalid(
                "DISCORD_MIN_CONFIDENCE",
                min_confidence,
                "must be within [0, 1]",
            ));
        }
        let min_strength: SignalStrength =
            parse(&get, "DISCORD_MIN_STRENGTH", SignalStrength::Moderate)?;
        let rate_limit_seconds: u64 = parse(&get, "DISCORD_RATE_LIMIT_SECONDS", 300)?;
        if rate_limit_seconds > MAX_RATE_LIMIT_SECONDS {
            return Err(invalid(
                "DISCORD_RATE_LIMIT_SECONDS",
                rate_limit_seconds,
                "cooldown is too large",
            ));
        }

        let window: usize = parse(&get, "VOLATILITY_WINDOW", 15)?;
        if window < 2 {
            return Err(invalid("VOLATILITY_WINDOW", window, "must be at least 2"));
        }
        let historical_days: usize = parse(&get, "HISTORICAL_DAYS", 30)?;
        if historical_days == 0 {
            return Err(invalid("HISTORICAL_DAYS", historical_days, "must be positive"));
        }

        let historical_pct: f64 = parse(&get, "HISTORICAL_PERCENTILE", 85.0)?;
        let moderate_pct: f64 = parse(&get, "MODERATE_PERCENTILE", 90.0)?;
        let extreme_pct: f64 = parse(&get, "EXTREME_PERCENTILE", 95.0)?;
        if !(historical_pct > 0.0
            && historical_pct <= moderate_pct
            && moderate_pct <= extreme_pct
            && extreme_pct <= 100.0)
        {
            return Err(ConfigError::Invalid {
                key: "HISTORICAL_PERCENTILE",
                value: format!("{}/{}/{}", historical_pct, moderate_pct, extreme_pct),
                reason: "percentiles must satisfy 0 < historical <= moderate <= extreme <= 100"
                    .to_string(),
            });
        }
        let annualization_periods: f64 = parse(&get, "ANNUALIZATION_PERIODS", 365.0)?;
        if annualization_periods <= 0.0 {
            return Err(invalid(
                "ANNUALIZATION_PERIODS",
                annualization_periods,
                "must be positive",
            ));
        }

        let momentum_lookback: usize = parse(&get, "MOMENTUM_LOOKBACK", 5)?;
        let momentum_deadband: f64 = parse(&get, "MOMENTUM_DEADBAND", 0.001)?;
        let max_position_fraction: f64 = parse(&get, "MAX_POSITION_FRACTION", 0.1)?;
        if !(max_position_fraction > 0.0 && max_position_fraction <= 1.0) {
            return Err(invalid(
                "MAX_POSITION_FRACTION",
                max_position_fraction,
                "must be within (0, 1]",
            ));
        }
        let target_volatility: f64 = parse(&get, "TARGET_VOLATILITY", 0.6)?;
        if target_volatility <= 0.0 {
            return Err(invalid("TARGET_VOLATILITY", target_volatility, "must be positive"));
        }

        let default_lookback = (historical_days + window + 5) as u32;
        let lookback_days: u32 = parse(&get, "LOOKBACK_DAYS", default_lookback)?;
        if (lookback_days as usize) < historical_days {
            return Err(invalid(
                "LOOKBACK_DAYS",
                lookback_days,
                "must cover HISTORICAL_DAYS",
            ));
        }
        if lookback_days > MAX_LOOKBACK_DAYS {
            return Err(invalid(
                "LOOKBACK_DAYS",
                lookback_days,
                &format!("must not exceed {} days", MAX_LOOKBACK_DAYS),
            ));
        }

        let interval_seconds: u64 =
            parse(&get, "SIGNAL_GENERATION_INTERVAL", DEFAULT_INTERVAL_SECONDS)?;
        if interval_seconds == 0 {
            return Err(invalid(
                "SIGNAL_GENERATION_INTERVAL",
                interval_seconds,
                "must be positive",
            ));
        }
        let signal_generation_interval = Duration::from_secs(interval_seconds);

        let tiers = match get("SIGNAL_TIERS") {
            Some(raw) => parse_tiers(&raw, signal_generation_interval)?,
            None => {
                let assets = split_assets(&get("ASSETS").unwrap_or_else(|| DEFAULT_ASSETS.to_string()));
                if assets.is_empty() {
                    return Err(invalid("ASSETS", "", "at least one asset is required"));
                }
                vec![TierConfig {
                    name: "default".to_string(),
                    interval: signal_generation_interval,
                    assets,
                }]
            }
        };

        let worker_concurrency: usize = parse(&get, "WORKER_CONCURRENCY", 4)?;
        if worker_concurrency == 0 {
            return Err(invalid("WORKER_CONCURRENCY", worker_concurrency, "must be positive"));
        }

        Ok(Self {
            environment: get("ENVIRONMENT").unwrap_or_else(|| "sandbox".to_string()),
            port: parse(&get, "PORT", 8080)?,
            thresholds: ThresholdConfig {
                min_confidence,
                min_strength,
                rate_limit_seconds,
            },
            analyzer: AnalyzerSettings {
                historical_percentile: historical_pct,
                extreme_percentile: extreme_pct,
                annualization_periods,
            },
            generator: GeneratorSettings {
                bands: StrengthBands {
                    historical: historical_pct,
                    moderate: moderate_pct,
                    extreme: extreme_pct,
                },
                momentum_lookback,
                momentum_deadband,
                max_position_fraction,
                target_volatility,
            },
            window: AnalysisWindow {
                window,
                historical_days,
            },
            lookback_days,
            signal_generation_interval,
            tiers,
            worker_concurrency,
            discord_webhook_url: get("DISCORD_WEBHOOK_URL"),
            discord_username: get("DISCORD_USERNAME").unwrap_or_else(|| "voltrix".to_string()),
            market_data_url: get("MARKET_DATA_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            market_data_api_key: get("MARKET_DATA_API_KEY"),
        })
    }

    /// Every asset across all tiers, sorted and deduplicated.
    pub fn all_assets(&self) -> Vec<String> {
        let mut assets: Vec<String> = self
            .tiers
            .iter()
            .flat_map(|t| t.assets.iter().cloned())
            .collect();
        assets.sort();
        assets.dedup();
        assets
    }
}

fn parse<T, G>(get: &G, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn invalid(key: &'static str, value: impl Display, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn split_assets(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parse `name[@seconds]=asset,asset;name2=asset`.
pub fn parse_tiers(raw: &str, default_interval: Duration) -> Result<Vec<TierConfig>, ConfigError> {
    let mut tiers: Vec<TierConfig> = Vec::new();

    for definition in raw.split(';').map(str::trim).filter(|d| !d.is_empty()) {
        let tier_error = |reason: &str| ConfigError::InvalidTier {
            definition: definition.to_string(),
            reason: reason.to_string(),
        };

        let (head, assets) = definition
            .split_once('=')
            .ok_or_else(|| tier_error("expected name=assets"))?;

        let (name, interval) = match head.split_once('@') {
            Some((name, secs)) => {
                let secs: u64 = secs
                    .trim()
                    .parse()
                    .map_err(|_| tier_error("interval must be whole seconds"))?;
                if secs == 0 {
                    return Err(tier_error("interval must be positive"));
                }
                (name.trim(), Duration::from_secs(secs))
            }
            None => (head.trim(), default_interval),
        };
        if name.is_empty() {
            return Err(tier_error("tier name is empty"));
        }
        if tiers.iter().any(|t| t.name == name) {
            return Err(tier_error("duplicate tier name"));
        }

        let assets = split_assets(assets);
        if assets.is_empty() {
            return Err(tier_error("tier has no assets"));
        }

        tiers.push(TierConfig {
            name: name.to_string(),
            interval,
            assets,
        });
    }

    if tiers.is_empty() {
        return Err(ConfigError::InvalidTier {
            definition: raw.to_string(),
            reason: "no tiers defined".to_string(),
        });
    }
    Ok(tiers)
}
