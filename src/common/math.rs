//! Statistical helpers used by the volatility analyzer

/// Log returns `ln(p[i] / p[i-1])` for consecutive prices.
///
/// Returns an empty vector for fewer than two prices.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| (w[1] / w[0]).ln()).collect()
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
///
/// Requires at least two values.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let avg = mean(values)?;
    let variance = values
        .iter()
        .map(|v| {
            let diff = v - avg;
            diff * diff
        })
        .sum::<f64>()
        / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Percentile of an ascending-sorted sample using linear interpolation
/// between order statistics.
///
/// `pct` is expressed 0-100 and clamped into that range.
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    if sorted.len() == 1 {
        return Some(sorted[0]);
    }

    let rank = (pct.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return Some(sorted[lower]);
    }
    let frac = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
}

/// Rank of `value` within an ascending-sorted sample, expressed 0-100.
///
/// Inverse of [`percentile_sorted`]: values between two order statistics are
/// interpolated linearly, ties resolve to the highest matching position so
/// a value equal to the sample maximum ranks 100.
pub fn percentile_rank_sorted(sorted: &[f64], value: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if value < sorted[0] {
        return Some(0.0);
    }
    if value >= sorted[n - 1] {
        return Some(100.0);
    }

    // sorted[0] <= value < sorted[n - 1], so n >= 2 and idx <= n - 2.
    let idx = sorted.partition_point(|s| *s <= value) - 1;
    let low = sorted[idx];
    let high = sorted[idx + 1];
    let frac = (value - low) / (high - low);
    let position = idx as f64 + frac;

    Some((position / (n - 1) as f64 * 100.0).clamp(0.0, 100.0))
}

/// Sort a sample ascending. NaNs are ordered last via `total_cmp`.
pub fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}
