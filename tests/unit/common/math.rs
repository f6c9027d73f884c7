//! Unit tests for statistical helpers

use voltrix::common::math::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_log_returns() {
    let returns = log_returns(&[100.0, 110.0, 99.0]);
    assert_eq!(returns.len(), 2);
    assert!(approx(returns[0], (1.1f64).ln()));
    assert!(approx(returns[1], (0.9f64).ln()));
    assert!(log_returns(&[100.0]).is_empty());
}

#[test]
fn test_sample_std_dev() {
    let sd = sample_std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
    // population sd is 2.0, sample sd = sqrt(32 / 7)
    assert!(approx(sd, (32.0f64 / 7.0).sqrt()));
    assert!(sample_std_dev(&[1.0]).is_none());
    assert_eq!(sample_std_dev(&[3.0, 3.0, 3.0]), Some(0.0));
}

#[test]
fn test_percentile_interpolates_between_order_statistics() {
    let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
    assert_eq!(percentile_sorted(&sorted, 0.0), Some(1.0));
    assert_eq!(percentile_sorted(&sorted, 50.0), Some(3.0));
    assert_eq!(percentile_sorted(&sorted, 100.0), Some(5.0));
    assert!(approx(percentile_sorted(&sorted, 85.0).unwrap(), 4.4));
    assert!(percentile_sorted(&[], 50.0).is_none());
    assert_eq!(percentile_sorted(&[7.0], 95.0), Some(7.0));
}

#[test]
fn test_percentile_rank_is_inverse_of_percentile() {
    let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
    assert_eq!(percentile_rank_sorted(&sorted, 0.5), Some(0.0));
    assert_eq!(percentile_rank_sorted(&sorted, 1.0), Some(0.0));
    assert_eq!(percentile_rank_sorted(&sorted, 5.0), Some(100.0));
    assert_eq!(percentile_rank_sorted(&sorted, 9.0), Some(100.0));
    assert!(approx(percentile_rank_sorted(&sorted, 3.0).unwrap(), 50.0));
    assert!(approx(percentile_rank_sorted(&sorted, 4.4).unwrap(), 85.0));

    for pct in [10.0, 33.0, 72.5, 95.0] {
        let value = percentile_sorted(&sorted, pct).unwrap();
        assert!(approx(percentile_rank_sorted(&sorted, value).unwrap(), pct));
    }
}

#[test]
fn test_percentile_rank_ties_resolve_high() {
    let sorted = [1.0, 2.0, 2.0, 2.0, 3.0];
    // value equal to a run of ties ranks at the last tied position
    assert!(approx(percentile_rank_sorted(&sorted, 2.0).unwrap(), 75.0));
    assert_eq!(percentile_rank_sorted(&[4.0, 4.0], 4.0), Some(100.0));
    assert!(percentile_rank_sorted(&[], 1.0).is_none());
}

#[test]
fn test_sorted_copy() {
    assert_eq!(sorted_copy(&[3.0, 1.0, 2.0]), vec![1.0, 2.0, 3.0]);
}
