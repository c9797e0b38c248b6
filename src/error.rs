//! Error types for the report pipeline

use thiserror::Error;

/// Run-level errors. Anything that reaches `main` ends the run.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Missing credential: {0}")]
    MissingCredential(String),

    /// A single CREATE or PUBLISH call was rejected
    #[error("Publish rejected ({status}): {body}")]
    Publish { status: u16, body: String },

    #[error("Container created without an id: {0}")]
    MissingContainerId(String),

    /// Both the full and the degraded attempt failed
    #[error("Publish failed after degraded retry: {0}")]
    PublishFailed(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// Why a symbol was left out of a run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkipReason {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("malformed series: {0}")]
    MalformedSeries(String),

    #[error("insufficient history: {valid_rows} valid rows, need {required}")]
    InsufficientHistory { valid_rows: usize, required: usize },

    #[error("no training rows")]
    EmptyTrainingSet,

    #[error("numeric failure: {0}")]
    Numeric(String),
}

impl SkipReason {
    /// Short label used in run summaries
    pub fn kind(&self) -> &'static str {
        match self {
            SkipReason::Fetch(_) => "fetch",
            SkipReason::MalformedSeries(_) => "malformed",
            SkipReason::InsufficientHistory { .. } => "insufficient_history",
            SkipReason::EmptyTrainingSet => "empty_training_set",
            SkipReason::Numeric(_) => "numeric",
        }
    }
}
