//! Daily equity forecast report
//!
//! Trains a small per-symbol return model, ranks the universe and publishes a
//! short text report to Threads.
//!
//! ## Architecture
//!
//! ```text
//! Calendar gate → Market data → Features → GBM predictor → Pivots
//!                                                   ↓
//!          History ← Publish (CREATE → SETTLE → PUBLISH, degrade once) ← Report ← Ranking
//! ```

pub mod calendar;
pub mod client;
pub mod config;
pub mod error;
pub mod ml;
pub mod pipeline;
pub mod publish;
pub mod ranking;
pub mod report;
pub mod storage;
pub mod types;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod config_tests;
