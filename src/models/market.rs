use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observation of an asset's price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self {
            timestamp,
            price,
            volume: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// Order points chronologically and drop duplicate timestamps, keeping the
/// last observation for each timestamp.
pub fn normalize_series(mut points: Vec<PricePoint>) -> Vec<PricePoint> {
    // Stable sort keeps arrival order among equal timestamps.
    points.sort_by_key(|p| p.timestamp);

    let mut normalized: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match normalized.last_mut() {
            Some(last) if last.timestamp == point.timestamp => *last = point,
            _ => normalized.push(point),
        }
    }
    normalized
}

/// Keep the last observation of each UTC calendar day. Input must be
/// chronological; the result is too.
pub fn resample_daily(points: Vec<PricePoint>) -> Vec<PricePoint> {
    let mut daily: Vec<PricePoint> = Vec::new();
    for point in points {
        match daily.last_mut() {
            Some(last) if last.timestamp.date_naive() == point.timestamp.date_naive() => {
                *last = point
            }
            _ => daily.push(point),
        }
    }
    daily
}
