//! Operator-facing alert rendering

use crate::models::{SignalDirection, TradingSignal, VolatilityMetrics};
use serde_json::{json, Value};

const COLOR_LONG: u32 = 0x2ecc71;
const COLOR_SHORT: u32 = 0xe74c3c;
const COLOR_NEUTRAL: u32 = 0x95a5a6;

/// One-line summary used for logs and plain-text transports.
pub fn format_alert_message(signal: &TradingSignal, metrics: &VolatilityMetrics) -> String {
    format!(
        "{} {} {} @ {:.4} | confidence {:.0}% | size {:.1}% | vol {:.1}% (p{:.0}) | {}",
        signal.strength,
        signal.direction,
        signal.asset,
        signal.price,
        signal.confidence * 100.0,
        signal.position_size * 100.0,
        metrics.current_volatility * 100.0,
        metrics.volatility_percentile,
        signal.reason
    )
}

/// Discord webhook body with a single embed.
pub fn discord_payload(
    signal: &TradingSignal,
    metrics: &VolatilityMetrics,
    username: &str,
) -> Value {
    let color = match signal.direction {
        SignalDirection::Long => COLOR_LONG,
        SignalDirection::Short => COLOR_SHORT,
        SignalDirection::Neutral => COLOR_NEUTRAL,
    };

    json!({
        "username": username,
        "embeds": [{
            "title": format!("{} {} signal: {}", signal.strength, signal.direction, signal.asset),
            "description": signal.reason,
            "color": color,
            "timestamp": signal.generated_at.to_rfc3339(),
            "fields": [
                { "name": "Price", "value": format!("{:.4}", signal.price), "inline": true },
                { "name": "Confidence", "value": format!("{:.1}%", signal.confidence * 100.0), "inline": true },
                { "name": "Position size", "value": format!("{:.2}%", signal.position_size * 100.0), "inline": true },
                { "name": "Volatility", "value": format!("{:.1}%", metrics.current_volatility * 100.0), "inline": true },
                { "name": "Threshold", "value": format!("{:.1}%", metrics.historical_threshold * 100.0), "inline": true },
                { "name": "Percentile", "value": format!("{:.1}", metrics.volatility_percentile), "inline": true }
            ]
        }]
    })
}
