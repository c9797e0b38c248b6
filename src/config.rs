//! Configuration loading
//!
//! Values come from an optional TOML file, then `REPORT__*` environment
//! overrides. The access token is read from `THREADS_TOKEN` when the file
//! does not set one.

use crate::error::{ReportError, Result};
use crate::ml::PredictorConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration, passed explicitly into the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub universe: UniverseConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl Config {
    /// Load from `path` (missing file is fine) plus environment overrides
    pub fn load(path: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("REPORT")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("universe.benchmarks")
                    .with_list_parse_key("universe.watchlist")
                    .try_parsing(true),
            )
            .build()?;

        let mut config: Config = settings.try_deserialize()?;

        if config.publish.access_token.is_none() {
            config.publish.access_token = std::env::var("THREADS_TOKEN")
                .ok()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty());
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.universe.benchmarks.is_empty() && self.universe.watchlist.is_empty() {
            return Err(ReportError::InvalidData("universe is empty".into()));
        }
        if self.model.feature_window == 0 {
            return Err(ReportError::InvalidData("model.feature_window must be positive".into()));
        }
        if self.model.horizon == 0 {
            return Err(ReportError::InvalidData("model.horizon must be positive".into()));
        }
        PredictorConfig::from(&self.model)
            .gbm
            .validate()
            .map_err(|e| ReportError::InvalidData(format!("model: {}", e)))?;
        if self.report.max_chars == 0 {
            return Err(ReportError::InvalidData("report.max_chars must be positive".into()));
        }
        Ok(())
    }
}

/// Symbols to evaluate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Market code passed to the calendar gate
    #[serde(default = "default_market")]
    pub market: String,
    /// Always reported, in this order, regardless of sign
    #[serde(default = "default_benchmarks")]
    pub benchmarks: Vec<String>,
    /// Discovery candidates
    #[serde(default = "default_watchlist")]
    pub watchlist: Vec<String>,
}

impl UniverseConfig {
    /// Benchmarks first, then watchlist, without duplicates
    pub fn symbols(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for s in self.benchmarks.iter().chain(self.watchlist.iter()) {
            if !out.contains(s) {
                out.push(s.clone());
            }
        }
        out
    }
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            market: default_market(),
            benchmarks: default_benchmarks(),
            watchlist: default_watchlist(),
        }
    }
}

fn default_market() -> String {
    "TW".to_string()
}

fn default_benchmarks() -> Vec<String> {
    vec!["0050.TW".to_string(), "2330.TW".to_string()]
}

fn default_watchlist() -> Vec<String> {
    [
        "2317.TW", "2454.TW", "2308.TW", "2382.TW", "2412.TW", "2881.TW", "2882.TW",
        "2891.TW", "3711.TW", "2303.TW", "2886.TW", "1301.TW", "2002.TW", "3008.TW",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Market data source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_url")]
    pub base_url: String,
    /// Yahoo range string, e.g. "2y"
    #[serde(default = "default_lookback")]
    pub lookback: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_url: default_data_url(),
            lookback: default_lookback(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_data_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_lookback() -> String {
    "2y".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Feature and predictor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_feature_window")]
    pub feature_window: usize,
    #[serde(default = "default_min_valid_rows")]
    pub min_valid_rows: usize,
    /// Forward-return horizon in bars
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    #[serde(default = "default_pivot_window")]
    pub pivot_window: usize,
    #[serde(default = "default_n_trees")]
    pub n_trees: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default = "default_subsample")]
    pub subsample: f64,
    #[serde(default = "default_min_samples_leaf")]
    pub min_samples_leaf: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            feature_window: default_feature_window(),
            min_valid_rows: default_min_valid_rows(),
            horizon: default_horizon(),
            pivot_window: default_pivot_window(),
            n_trees: default_n_trees(),
            max_depth: default_max_depth(),
            learning_rate: default_learning_rate(),
            subsample: default_subsample(),
            min_samples_leaf: default_min_samples_leaf(),
            seed: default_seed(),
        }
    }
}

fn default_feature_window() -> usize {
    20
}

fn default_min_valid_rows() -> usize {
    150
}

fn default_horizon() -> usize {
    5
}

fn default_pivot_window() -> usize {
    20
}

fn default_n_trees() -> usize {
    100
}

fn default_max_depth() -> usize {
    3
}

fn default_learning_rate() -> f64 {
    0.05
}

fn default_subsample() -> f64 {
    0.8
}

fn default_min_samples_leaf() -> usize {
    5
}

fn default_seed() -> u64 {
    42
}

/// Report layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_disclaimer")]
    pub disclaimer: Option<String>,
    /// Promotional/link footer, dropped in the degraded variant
    #[serde(default)]
    pub promo: Option<String>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            top_n: default_top_n(),
            max_chars: default_max_chars(),
            disclaimer: default_disclaimer(),
            promo: None,
        }
    }
}

fn default_title() -> String {
    "📈 AI 5-day outlook".to_string()
}

fn default_top_n() -> usize {
    5
}

fn default_max_chars() -> usize {
    500
}

fn default_disclaimer() -> Option<String> {
    Some("Model output only. Not investment advice.".to_string())
}

/// Threads publishing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    #[serde(default = "default_publish_url")]
    pub base_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
    /// Skip the `/me` lookup when set
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl PublishConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.settle_delay_secs)
    }

    pub fn require_token(&self) -> Result<&str> {
        self.access_token
            .as_deref()
            .ok_or_else(|| ReportError::MissingCredential("THREADS_TOKEN".into()))
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            base_url: default_publish_url(),
            access_token: None,
            user_id: None,
            settle_delay_secs: default_settle_delay_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_publish_url() -> String {
    "https://graph.threads.net/v1.0".to_string()
}

fn default_settle_delay_secs() -> u64 {
    30
}

/// History CSV location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_path")]
    pub path: String,
}

impl HistoryConfig {
    /// Path with `~` and environment variables expanded
    pub fn resolved_path(&self) -> PathBuf {
        let expanded = shellexpand::full(&self.path)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| self.path.clone());
        PathBuf::from(expanded)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: default_history_path(),
        }
    }
}

fn default_history_path() -> String {
    "data/prediction_history.csv".to_string()
}

/// Non-trading dates on top of weekends
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default)]
    pub holidays: Vec<NaiveDate>,
}
