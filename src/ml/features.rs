//! Rolling technical features
//!
//! Computes, for every bar with a full lookback window:
//! - `momentum_20`: close / close 20 bars ago - 1
//! - `bias_20`: distance of close from its 20-bar mean, as a fraction of that mean
//! - `volume_ratio_20`: volume / 20-bar mean volume
//!
//! Bars without a full window, or with any non-finite input, are dropped.

use crate::error::SkipReason;
use crate::types::{FeatureRow, FeatureVector, PricePoint, PriceSeries};
use tracing::debug;

/// Feature extraction settings
#[derive(Debug, Clone, Copy)]
pub struct FeatureConfig {
    /// Rolling window length
    pub window: usize,
    /// Minimum surviving rows for a symbol to be usable
    pub min_valid_rows: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            window: 20,
            min_valid_rows: 150,
        }
    }
}

/// Turns a price series into per-bar feature rows
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    config: FeatureConfig,
}

impl FeatureEngineer {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Feature rows for every bar at index >= window, or `InsufficientHistory`
    pub fn engineer(&self, series: &PriceSeries) -> Result<Vec<FeatureRow>, SkipReason> {
        let rows = self.compute_rows(series.points());

        debug!(
            "{}: {} bars -> {} feature rows",
            series.symbol(),
            series.len(),
            rows.len()
        );

        if rows.len() < self.config.min_valid_rows {
            return Err(SkipReason::InsufficientHistory {
                valid_rows: rows.len(),
                required: self.config.min_valid_rows,
            });
        }

        Ok(rows)
    }

    /// All defined rows, without the minimum-count check
    pub fn compute_rows(&self, points: &[PricePoint]) -> Vec<FeatureRow> {
        let window = self.config.window;
        if window == 0 || points.len() <= window {
            return Vec::new();
        }

        (window..points.len())
            .filter_map(|t| self.row_at(points, t))
            .collect()
    }

    fn row_at(&self, points: &[PricePoint], t: usize) -> Option<FeatureRow> {
        let window = self.config.window;
        let current = &points[t];
        let lagged = points[t - window].close;
        let recent = &points[t + 1 - window..=t];

        let close_mean = finite_mean(recent.iter().map(|p| p.close))?;
        let volume_mean = finite_mean(recent.iter().map(|p| p.volume))?;

        if !current.close.is_finite() || !current.volume.is_finite() || !lagged.is_finite() {
            return None;
        }
        if lagged == 0.0 || close_mean == 0.0 || volume_mean == 0.0 {
            return None;
        }

        let features = FeatureVector {
            momentum_20: current.close / lagged - 1.0,
            bias_20: (current.close - close_mean) / close_mean,
            volume_ratio_20: current.volume / volume_mean,
        };

        features.as_array().iter().all(|v| v.is_finite()).then_some(FeatureRow {
            index: t,
            close: current.close,
            features,
        })
    }
}

/// Mean of the values, `None` if any value is non-finite or the input is empty
fn finite_mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for v in values {
        if !v.is_finite() {
            return None;
        }
        sum += v;
        n += 1;
    }
    (n > 0).then(|| sum / n as f64)
}
