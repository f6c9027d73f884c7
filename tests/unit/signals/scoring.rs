//! Unit tests for percentile scoring, momentum and sizing

use voltrix::models::{SignalDirection, SignalStrength};
use voltrix::signals::scoring::*;

#[test]
fn test_classify_strength_bands() {
    let bands = StrengthBands::default();
    assert_eq!(classify_strength(80.0, &bands), None);
    assert_eq!(classify_strength(85.0, &bands), Some(SignalStrength::Weak));
    assert_eq!(classify_strength(89.9, &bands), Some(SignalStrength::Weak));
    assert_eq!(classify_strength(90.0, &bands), Some(SignalStrength::Moderate));
    assert_eq!(classify_strength(95.0, &bands), Some(SignalStrength::Strong));
    assert_eq!(classify_strength(100.0, &bands), Some(SignalStrength::Strong));
}

#[test]
fn test_confidence_is_monotonic_and_bounded() {
    let mut previous = -1.0;
    for pct in [0.0, 10.0, 50.0, 85.0, 90.0, 99.0, 100.0] {
        let confidence = confidence_from_percentile(pct);
        assert!((0.0..=1.0).contains(&confidence));
        assert!(confidence >= previous);
        previous = confidence;
    }
    assert_eq!(confidence_from_percentile(150.0), 1.0);
    assert_eq!(confidence_from_percentile(-5.0), 0.0);
    assert_eq!(confidence_from_percentile(f64::NAN), 0.0);
}

#[test]
fn test_score_percentile() {
    let bands = StrengthBands::default();
    assert_eq!(score_percentile(50.0, &bands), None);

    let (strength, confidence) = score_percentile(92.0, &bands).unwrap();
    assert_eq!(strength, SignalStrength::Moderate);
    assert!((confidence - 0.92).abs() < 1e-12);
}

#[test]
fn test_momentum() {
    let prices = [100.0, 101.0, 102.0, 103.0, 104.0, 105.0];
    let m = momentum(&prices, 110.0, 5).unwrap();
    assert!((m - 0.1).abs() < 1e-12);

    // Lookback longer than the series falls back to the first point.
    let m = momentum(&prices, 50.0, 100).unwrap();
    assert!((m + 0.5).abs() < 1e-12);

    assert!(momentum(&[], 100.0, 5).is_none());
}

#[test]
fn test_direction_from_momentum() {
    assert_eq!(direction_from_momentum(0.05, 0.001), SignalDirection::Long);
    assert_eq!(direction_from_momentum(-0.05, 0.001), SignalDirection::Short);
    assert_eq!(direction_from_momentum(0.0005, 0.001), SignalDirection::Neutral);
    assert_eq!(direction_from_momentum(-0.001, 0.001), SignalDirection::Neutral);
}

#[test]
fn test_position_size_shrinks_with_volatility() {
    assert_eq!(position_size(0.3, 0.6, 0.1), 0.1);
    assert!((position_size(1.2, 0.6, 0.1) - 0.05).abs() < 1e-12);
    assert!(position_size(2.4, 0.6, 0.1) < position_size(1.2, 0.6, 0.1));
    assert_eq!(position_size(0.0, 0.6, 0.1), 0.1);
    assert_eq!(position_size(f64::NAN, 0.6, 0.1), 0.1);
}
