//! Machine learning prediction module
//!
//! Provides per-symbol return prediction with:
//! - Rolling technical features (momentum, bias, volume ratio)
//! - Seeded gradient boosted regression trees
//! - Classic pivot support/resistance levels

pub mod features;
pub mod gbm;
pub mod pivot;
pub mod predictor;


pub use features::{FeatureConfig, FeatureEngineer};
pub use gbm::{GbmError, GbmParams, GradientBoostingRegressor};
pub use pivot::PivotCalculator;
pub use predictor::{PredictorConfig, SymbolPredictor};
