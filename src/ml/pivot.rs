//! Classic pivot support/resistance levels

use crate::types::{PivotLevels, PricePoint};

/// Default number of trailing bars used for pivots
pub const PIVOT_WINDOW: usize = 20;

/// Derives support/resistance from a trailing window
#[derive(Debug, Clone, Copy)]
pub struct PivotCalculator {
    window: usize,
}

impl Default for PivotCalculator {
    fn default() -> Self {
        Self::new(PIVOT_WINDOW)
    }
}

impl PivotCalculator {
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// Pivot levels from the last `window` bars.
    ///
    /// Returns `PivotLevels::NEUTRAL` instead of failing when the window is
    /// empty or contains non-finite or inverted (high < low) bars.
    pub fn calculate(&self, points: &[PricePoint]) -> PivotLevels {
        let recent = &points[points.len().saturating_sub(self.window)..];
        let Some(last) = recent.last() else {
            return PivotLevels::NEUTRAL;
        };

        let malformed = recent.iter().any(|p| {
            !p.high.is_finite() || !p.low.is_finite() || !p.close.is_finite() || p.high < p.low
        });
        if malformed {
            return PivotLevels::NEUTRAL;
        }

        let high = recent.iter().map(|p| p.high).fold(f64::MIN, f64::max);
        let low = recent.iter().map(|p| p.low).fold(f64::MAX, f64::min);
        let pivot = (high + low + last.close) / 3.0;

        PivotLevels {
            support: round1(2.0 * pivot - high),
            resistance: round1(2.0 * pivot - low),
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn bar(day: i64, high: f64, low: f64, close: f64) -> PricePoint {
        PricePoint {
            timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(day),
            open: close,
            high,
            low,
            close,
            volume: 1.0,
        }
    }

    #[test]
    fn test_classic_pivot() {
        let points = vec![bar(0, 110.0, 95.0, 100.0), bar(1, 108.0, 90.0, 105.0)];
        // pivot = (110 + 90 + 105) / 3 = 101.666..
        let levels = PivotCalculator::default().calculate(&points);
        assert_eq!(levels.support, 93.3);
        assert_eq!(levels.resistance, 113.3);
    }

    #[test]
    fn test_uses_only_trailing_window() {
        let mut points = vec![bar(0, 1000.0, 1.0, 500.0)];
        points.extend((1..=20).map(|d| bar(d, 11.0, 9.0, 10.0)));
        let levels = PivotCalculator::default().calculate(&points);
        // pivot = (11 + 9 + 10) / 3 = 10
        assert_eq!(levels.support, 9.0);
        assert_eq!(levels.resistance, 11.0);
    }

    #[test]
    fn test_empty_window_is_neutral() {
        assert_eq!(PivotCalculator::default().calculate(&[]), PivotLevels::NEUTRAL);
    }

    #[test]
    fn test_malformed_window_is_neutral() {
        let points = vec![bar(0, 10.0, 9.0, 9.5), bar(1, f64::NAN, 9.0, 9.5)];
        assert!(PivotCalculator::default().calculate(&points).is_neutral());

        let inverted = vec![bar(0, 8.0, 9.0, 8.5)];
        assert!(PivotCalculator::default().calculate(&inverted).is_neutral());
    }
}
