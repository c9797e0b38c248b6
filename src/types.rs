//! Core data types shared across pipeline stages

use crate::error::SkipReason;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One daily OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PricePoint {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// Time-ordered bars for one symbol.
///
/// Timestamps are strictly increasing and no two bars share a calendar date.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, SkipReason> {
        for pair in points.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(SkipReason::MalformedSeries(format!(
                    "timestamps not increasing at {}",
                    pair[1].timestamp
                )));
            }
            if pair[1].date() == pair[0].date() {
                return Err(SkipReason::MalformedSeries(format!(
                    "duplicate date {}",
                    pair[1].date()
                )));
            }
        }

        Ok(Self {
            symbol: symbol.into(),
            points,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }
}

/// Technical features for one bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub momentum_20: f64,
    pub bias_20: f64,
    pub volume_ratio_20: f64,
}

impl FeatureVector {
    pub fn as_array(&self) -> [f64; 3] {
        [self.momentum_20, self.bias_20, self.volume_ratio_20]
    }
}

/// Feature vector tagged with the series index it was computed at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub index: usize,
    pub close: f64,
    pub features: FeatureVector,
}

/// Feature vector paired with its forward return
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingRow {
    pub features: FeatureVector,
    pub target: f64,
}

/// Classic pivot support/resistance pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PivotLevels {
    pub support: f64,
    pub resistance: f64,
}

impl PivotLevels {
    pub const NEUTRAL: PivotLevels = PivotLevels {
        support: 0.0,
        resistance: 0.0,
    };

    pub fn is_neutral(&self) -> bool {
        *self == Self::NEUTRAL
    }
}

/// Per-symbol outcome of one run
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub symbol: String,
    /// Forward 5-period return estimate (0.012 = +1.2%)
    pub predicted_return: f64,
    pub last_close: f64,
    pub pivot: Option<PivotLevels>,
}

impl PredictionResult {
    pub fn predicted_pct(&self) -> f64 {
        self.predicted_return * 100.0
    }

    pub fn support(&self) -> Option<f64> {
        self.pivot.filter(|p| !p.is_neutral()).map(|p| p.support)
    }
}

/// Predictions keyed by symbol. The key is always the result's own symbol.
#[derive(Debug, Clone, Default)]
pub struct PredictionSet {
    results: BTreeMap<String, PredictionResult>,
}

impl PredictionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a result, replacing any earlier one for the same symbol
    pub fn insert(&mut self, result: PredictionResult) -> Option<PredictionResult> {
        self.results.insert(result.symbol.clone(), result)
    }

    pub fn get(&self, symbol: &str) -> Option<&PredictionResult> {
        self.results.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.results.contains_key(symbol)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PredictionResult> {
        self.results.values()
    }
}

impl FromIterator<PredictionResult> for PredictionSet {
    fn from_iter<I: IntoIterator<Item = PredictionResult>>(iter: I) -> Self {
        let mut set = Self::new();
        for result in iter {
            set.insert(result);
        }
        set
    }
}

/// Row appended to the history sink after a successful publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub date: NaiveDate,
    pub symbol: String,
    pub entry_price: f64,
    pub predicted_return: f64,
    pub settled: bool,
}

impl HistoryRecord {
    pub fn unsettled(date: NaiveDate, result: &PredictionResult) -> Self {
        Self {
            date,
            symbol: result.symbol.clone(),
            entry_price: result.last_close,
            predicted_return: result.predicted_return,
            settled: false,
        }
    }
}
