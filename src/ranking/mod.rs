//! Candidate ranking
//!
//! Splits results into a fixed benchmark set, reported in configured order
//! regardless of sign, and a discovery set: strictly positive predictions,
//! highest first, ties broken by ascending symbol, capped at `top_n`.

use crate::types::{PredictionResult, PredictionSet};
use std::cmp::Ordering;

/// Ordered selection handed to the report composer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub discovery: Vec<PredictionResult>,
    pub benchmarks: Vec<PredictionResult>,
}

#[derive(Debug, Clone)]
pub struct RankingEngine {
    benchmarks: Vec<String>,
    top_n: usize,
}

impl RankingEngine {
    pub fn new(benchmarks: Vec<String>, top_n: usize) -> Self {
        Self { benchmarks, top_n }
    }

    pub fn is_benchmark(&self, symbol: &str) -> bool {
        self.benchmarks.iter().any(|b| b == symbol)
    }

    pub fn rank(&self, results: &PredictionSet) -> Ranking {
        let benchmarks = self
            .benchmarks
            .iter()
            .filter_map(|symbol| results.get(symbol).cloned())
            .collect();

        let mut discovery: Vec<PredictionResult> = results
            .iter()
            .filter(|r| !self.is_benchmark(&r.symbol) && r.predicted_return > 0.0)
            .cloned()
            .collect();
        discovery.sort_by(compare_for_discovery);
        discovery.truncate(self.top_n);

        Ranking {
            discovery,
            benchmarks,
        }
    }
}

/// Descending return, then ascending symbol
fn compare_for_discovery(a: &PredictionResult, b: &PredictionResult) -> Ordering {
    b.predicted_return
        .total_cmp(&a.predicted_return)
        .then_with(|| a.symbol.cmp(&b.symbol))
}
