//! Synthetic fixtures shared by unit tests

use crate::types::{PricePoint, PriceSeries};
use chrono::{Duration, TimeZone, Utc};

/// Geometric drift of `total_drift` over `len` daily bars with linearly
/// rising volume
pub fn drifting_series(symbol: &str, len: usize, total_drift: f64) -> PriceSeries {
    let step = (1.0 + total_drift).powf(1.0 / len.max(1) as f64);
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 5, 30, 0).unwrap();
    let points = (0..len)
        .map(|i| {
            let close = 100.0 * step.powi(i as i32);
            PricePoint {
                timestamp: start + Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 10_000.0 + 50.0 * i as f64,
            }
        })
        .collect();
    PriceSeries::new(symbol, points).unwrap()
}
