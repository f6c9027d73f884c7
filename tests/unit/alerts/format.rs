//! Unit tests for alert rendering

use chrono::Utc;
use voltrix::alerts::format::{discord_payload, format_alert_message};
use voltrix::models::{SignalDirection, SignalStrength, TradingSignal, VolatilityMetrics};

fn sample() -> (TradingSignal, VolatilityMetrics) {
    let signal = TradingSignal {
        asset: "bitcoin".to_string(),
        direction: SignalDirection::Short,
        price: 64250.5,
        strength: SignalStrength::Strong,
        confidence: 0.97,
        position_size: 0.045,
        reason: "Volatility breakout".to_string(),
        generated_at: Utc::now(),
    };
    let metrics = VolatilityMetrics {
        current_volatility: 1.32,
        historical_threshold: 0.71,
        extreme_threshold: 0.95,
        volatility_percentile: 97.0,
        sample_count: 30,
    };
    (signal, metrics)
}

#[test]
fn test_format_alert_message() {
    let (signal, metrics) = sample();
    let message = format_alert_message(&signal, &metrics);

    assert!(message.starts_with("STRONG SHORT bitcoin @ 64250.5000"));
    assert!(message.contains("confidence 97%"));
    assert!(message.contains("size 4.5%"));
    assert!(message.contains("vol 132.0% (p97)"));
    assert!(message.ends_with("Volatility breakout"));
}

#[test]
fn test_discord_payload() {
    let (signal, metrics) = sample();
    let payload = discord_payload(&signal, &metrics, "voltrix");

    assert_eq!(payload["username"], "voltrix");
    let embed = &payload["embeds"][0];
    assert_eq!(embed["title"], "STRONG SHORT signal: bitcoin");
    assert_eq!(embed["description"], "Volatility breakout");
    assert_eq!(embed["color"], 0xe74c3c);

    let fields = embed["fields"].as_array().unwrap();
    assert_eq!(fields.len(), 6);
    assert_eq!(fields[0]["name"], "Price");
    assert_eq!(fields[1]["value"], "97.0%");
}
