//! Per-symbol forward-return predictor
//!
//! For one price series:
//! 1. build feature rows (bars 0..window never appear)
//! 2. pair every row whose forward window is fully observed with its
//!    `horizon`-bar forward return
//! 3. fit a fresh, seeded gradient boosted model on those pairs
//! 4. predict on the most recent feature row, which has no target
//!
//! Nothing is cached between symbols or runs.
//!
//! Usage:
//! ```ignore
//! let predictor = SymbolPredictor::new(PredictorConfig::default());
//! let result = predictor.predict(&series)?;
//! ```

use super::features::{FeatureConfig, FeatureEngineer};
use super::gbm::{GbmParams, GradientBoostingRegressor};
use super::pivot::{PivotCalculator, PIVOT_WINDOW};
use crate::config::ModelConfig;
use crate::error::SkipReason;
use crate::types::{FeatureRow, PredictionResult, PriceSeries, TrainingRow};
use tracing::debug;

/// Predictor configuration
#[derive(Debug, Clone)]
pub struct PredictorConfig {
    pub features: FeatureConfig,
    /// Forward-return horizon in bars
    pub horizon: usize,
    pub pivot_window: usize,
    pub gbm: GbmParams,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            horizon: 5,
            pivot_window: PIVOT_WINDOW,
            gbm: GbmParams::default(),
        }
    }
}

impl From<&ModelConfig> for PredictorConfig {
    fn from(model: &ModelConfig) -> Self {
        Self {
            features: FeatureConfig {
                window: model.feature_window,
                min_valid_rows: model.min_valid_rows,
            },
            horizon: model.horizon,
            pivot_window: model.pivot_window,
            gbm: GbmParams {
                n_trees: model.n_trees,
                max_depth: model.max_depth,
                learning_rate: model.learning_rate,
                subsample: model.subsample,
                min_samples_leaf: model.min_samples_leaf,
                seed: model.seed,
            },
        }
    }
}

/// Fits one model per call and returns a single forward-return estimate
pub struct SymbolPredictor {
    config: PredictorConfig,
    engineer: FeatureEngineer,
    pivots: PivotCalculator,
}

impl SymbolPredictor {
    pub fn new(config: PredictorConfig) -> Self {
        let engineer = FeatureEngineer::new(config.features);
        let pivots = PivotCalculator::new(config.pivot_window);
        Self {
            config,
            engineer,
            pivots,
        }
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }

    /// Rows whose `horizon`-bar forward close lies inside the series
    pub fn training_rows(&self, series: &PriceSeries, rows: &[FeatureRow]) -> Vec<TrainingRow> {
        let points = series.points();
        rows.iter()
            .filter(|row| row.index + self.config.horizon < points.len())
            .filter_map(|row| {
                let future = points[row.index + self.config.horizon].close;
                let target = future / row.close - 1.0;
                target.is_finite().then_some(TrainingRow {
                    features: row.features,
                    target,
                })
            })
            .collect()
    }

    /// Full train/predict protocol for one symbol
    pub fn predict(&self, series: &PriceSeries) -> Result<PredictionResult, SkipReason> {
        let rows = self.engineer.engineer(series)?;
        let training = self.training_rows(series, &rows);
        if training.is_empty() {
            return Err(SkipReason::EmptyTrainingSet);
        }

        let latest = rows.last().ok_or(SkipReason::EmptyTrainingSet)?;

        let x: Vec<Vec<f64>> = training.iter().map(|r| r.features.as_array().to_vec()).collect();
        let y: Vec<f64> = training.iter().map(|r| r.target).collect();

        let model = GradientBoostingRegressor::fit(self.config.gbm.clone(), &x, &y)
            .map_err(|e| SkipReason::Numeric(e.to_string()))?;
        let predicted_return = model
            .predict(&latest.features.as_array())
            .map_err(|e| SkipReason::Numeric(e.to_string()))?;

        if !predicted_return.is_finite() {
            return Err(SkipReason::Numeric("non-finite prediction".into()));
        }

        let pivot = self.pivots.calculate(series.points());

        debug!(
            "{}: trained on {} rows, predicted {:+.4} from bar {}",
            series.symbol(),
            training.len(),
            predicted_return,
            latest.index
        );

        Ok(PredictionResult {
            symbol: series.symbol().to_string(),
            predicted_return,
            last_close: latest.close,
            pivot: Some(pivot),
        })
    }
}
