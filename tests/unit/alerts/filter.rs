//! Unit tests for the alert filter

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use voltrix::alerts::{
    AlertFilter, AlertPhase, AlertStateStore, AssetAlertState, FilterDecision, RejectReason,
    ThresholdConfig,
};
use voltrix::config::MAX_RATE_LIMIT_SECONDS;
use voltrix::models::{SignalDirection, SignalStrength, TradingSignal};

fn signal(asset: &str, strength: SignalStrength, confidence: f64) -> TradingSignal {
    TradingSignal {
        asset: asset.to_string(),
        direction: SignalDirection::Long,
        price: 100.0,
        strength,
        confidence,
        position_size: 0.05,
        reason: "test".to_string(),
        generated_at: Utc::now(),
    }
}

fn filter() -> AlertFilter {
    AlertFilter::new(ThresholdConfig::default(), Arc::new(AlertStateStore::new()))
}

#[tokio::test]
async fn test_cooldown_window() {
    let filter = filter();
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let s = signal("ethereum", SignalStrength::Strong, 0.9);

    assert_eq!(filter.evaluate_at(&s, t0).await, FilterDecision::Accepted);
    assert_eq!(
        filter.evaluate_at(&s, t0 + Duration::seconds(60)).await,
        FilterDecision::Rejected(RejectReason::RateLimited)
    );
    assert_eq!(
        filter.evaluate_at(&s, t0 + Duration::seconds(310)).await,
        FilterDecision::Accepted
    );

    let state = filter.state().get("ethereum").await;
    assert_eq!(state.last_alert_time, Some(t0 + Duration::seconds(310)));
}

#[tokio::test]
async fn test_cooldown_counts_from_last_accepted_alert() {
    let filter = filter();
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let s = signal("ethereum", SignalStrength::Strong, 0.9);

    assert!(filter.evaluate_at(&s, t0).await.is_accepted());
    // Rejections do not extend the cooldown.
    for secs in [100, 200, 299] {
        assert!(!filter.evaluate_at(&s, t0 + Duration::seconds(secs)).await.is_accepted());
    }
    assert!(filter.evaluate_at(&s, t0 + Duration::seconds(300)).await.is_accepted());
}

#[tokio::test]
async fn test_thresholds_are_conjunctive() {
    let filter = filter();
    let t0 = Utc::now();

    let low_confidence = signal("bitcoin", SignalStrength::Strong, 0.5);
    let weak = signal("bitcoin", SignalStrength::Weak, 0.99);
    let nan = signal("bitcoin", SignalStrength::Strong, f64::NAN);

    for s in [&low_confidence, &weak, &nan] {
        assert_eq!(
            filter.evaluate_at(s, t0).await,
            FilterDecision::Rejected(RejectReason::BelowThreshold)
        );
    }

    let ok = signal("bitcoin", SignalStrength::Moderate, 0.8);
    assert!(filter.passes_thresholds(&ok));
    assert!(filter.evaluate_at(&ok, t0).await.is_accepted());
}

#[tokio::test]
async fn test_below_threshold_leaves_state_untouched() {
    let filter = filter();
    let t0 = Utc::now();

    filter
        .evaluate_at(&signal("bitcoin", SignalStrength::Weak, 0.95), t0)
        .await;
    assert_eq!(
        filter.state().get("bitcoin").await,
        AssetAlertState::default()
    );

    // A qualifying signal right after is not rate-limited.
    assert!(filter
        .evaluate_at(&signal("bitcoin", SignalStrength::Strong, 0.95), t0)
        .await
        .is_accepted());
}

#[tokio::test]
async fn test_assets_are_independent() {
    let filter = filter();
    let t0 = Utc::now();

    assert!(filter
        .evaluate_at(&signal("bitcoin", SignalStrength::Strong, 0.9), t0)
        .await
        .is_accepted());
    assert!(filter
        .evaluate_at(&signal("ethereum", SignalStrength::Strong, 0.9), t0)
        .await
        .is_accepted());
    assert_eq!(
        filter
            .evaluate_at(&signal("bitcoin", SignalStrength::Strong, 0.9), t0)
            .await,
        FilterDecision::Rejected(RejectReason::RateLimited)
    );

    let snapshot = filter.state().snapshot().await;
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("ethereum"), Some(&t0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_candidates_accept_exactly_one() {
    let filter = Arc::new(filter());
    let now = Utc::now();

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let filter = filter.clone();
            tokio::spawn(async move {
                filter
                    .evaluate_at(&signal("solana", SignalStrength::Strong, 0.9), now)
                    .await
            })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_accepted() {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 1);
}

#[tokio::test]
async fn test_zero_rate_limit_never_cools() {
    let filter = AlertFilter::new(
        ThresholdConfig {
            rate_limit_seconds: 0,
            ..ThresholdConfig::default()
        },
        Arc::new(AlertStateStore::new()),
    );
    let t0 = Utc::now();
    let s = signal("bitcoin", SignalStrength::Strong, 0.9);

    assert!(filter.evaluate_at(&s, t0).await.is_accepted());
    assert!(filter.evaluate_at(&s, t0).await.is_accepted());
}

#[tokio::test]
async fn test_huge_rate_limit_keeps_asset_cooling() {
    for rate_limit_seconds in [MAX_RATE_LIMIT_SECONDS, u64::MAX] {
        let filter = AlertFilter::new(
            ThresholdConfig {
                rate_limit_seconds,
                ..ThresholdConfig::default()
            },
            Arc::new(AlertStateStore::new()),
        );
        let s = signal("bitcoin", SignalStrength::Strong, 0.9);

        assert!(filter.evaluate(&s).await.is_accepted());
        assert_eq!(
            filter.evaluate(&s).await,
            FilterDecision::Rejected(RejectReason::RateLimited)
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_queued_candidates_never_move_back_in_time() {
    let filter = Arc::new(AlertFilter::new(
        ThresholdConfig {
            rate_limit_seconds: 0,
            ..ThresholdConfig::default()
        },
        Arc::new(AlertStateStore::new()),
    ));

    let handles: Vec<_> = (0..20)
        .map(|_| {
            let filter = filter.clone();
            tokio::spawn(async move {
                let decision = filter
                    .evaluate(&signal("bitcoin", SignalStrength::Strong, 0.9))
                    .await;
                let last = filter.state().get("bitcoin").await.last_alert_time;
                (decision, last)
            })
        })
        .collect();

    for handle in handles {
        let (decision, last) = handle.await.unwrap();
        assert_eq!(decision, FilterDecision::Accepted);
        assert!(last.is_some());
    }
}

#[tokio::test]
async fn test_alert_times_are_non_decreasing() {
    let filter = AlertFilter::new(
        ThresholdConfig {
            rate_limit_seconds: 0,
            ..ThresholdConfig::default()
        },
        Arc::new(AlertStateStore::new()),
    );
    let s = signal("ethereum", SignalStrength::Strong, 0.9);

    let mut previous = None;
    for _ in 0..10 {
        assert!(filter.evaluate(&s).await.is_accepted());
        let last = filter.state().get("ethereum").await.last_alert_time;
        assert!(last >= previous);
        previous = last;
    }
}

#[test]
fn test_phase() {
    let t0 = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let cooldown = Duration::seconds(300);

    assert_eq!(
        AssetAlertState::default().phase(t0, cooldown),
        AlertPhase::Eligible
    );

    let state = AssetAlertState {
        last_alert_time: Some(t0),
    };
    assert_eq!(state.phase(t0 + Duration::seconds(299), cooldown), AlertPhase::Cooling);
    assert_eq!(state.phase(t0 + Duration::seconds(300), cooldown), AlertPhase::Eligible);
}

#[test]
fn test_reject_reason_labels() {
    assert_eq!(RejectReason::BelowThreshold.to_string(), "below-threshold");
    assert_eq!(RejectReason::RateLimited.as_str(), "rate-limited");
}
