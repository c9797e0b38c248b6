//! End-to-end report run
//!
//! ```text
//! Calendar gate → per symbol: fetch → features → model → pivots
//!               → Ranking → Report → Publish → History
//! ```
//!
//! Symbols are processed one at a time. A failure for one symbol becomes a
//! `SkipReason` and never stops the others, but a run where every symbol was
//! skipped is an error. History is written only after a successful publish.


use crate::calendar::TradingCalendar;
use crate::client::MarketDataProvider;
use crate::config::Config;
use crate::error::{ReportError, Result, SkipReason};
use crate::ml::{PredictorConfig, SymbolPredictor};
use crate::publish::{PublishCoordinator, PublishReceipt};
use crate::ranking::{Ranking, RankingEngine};
use crate::report::{Report, ReportComposer};
use crate::storage::HistorySink;
use crate::types::{HistoryRecord, PredictionResult, PredictionSet};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Per-invocation switches
#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    pub date: NaiveDate,
    /// Bypass the calendar gate
    pub force: bool,
    /// Render only; no publish, no history
    pub dry_run: bool,
}

/// Predictions plus the symbols that were left out
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub results: PredictionSet,
    pub skipped: Vec<(String, SkipReason)>,
}

impl Evaluation {
    /// Skip counts keyed by reason kind
    pub fn skip_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for (_, reason) in &self.skipped {
            *counts.entry(reason.kind()).or_insert(0) += 1;
        }
        counts
    }
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub evaluation: Evaluation,
    pub ranking: Ranking,
    pub report: Report,
    /// `None` for dry runs
    pub receipt: Option<PublishReceipt>,
    pub history_rows: usize,
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Calendar gate said no and the run was not forced
    MarketClosed,
    Completed(Box<RunSummary>),
}

pub struct ReportPipeline {
    config: Config,
    provider: Arc<dyn MarketDataProvider>,
    calendar: Arc<dyn TradingCalendar>,
    history: Arc<dyn HistorySink>,
    publisher: Option<PublishCoordinator>,
    predictor: SymbolPredictor,
    ranking: RankingEngine,
    composer: ReportComposer,
}

impl ReportPipeline {
    /// `publisher` may be `None` only for dry runs
    pub fn new(
        config: Config,
        provider: Arc<dyn MarketDataProvider>,
        calendar: Arc<dyn TradingCalendar>,
        history: Arc<dyn HistorySink>,
        publisher: Option<PublishCoordinator>,
    ) -> Self {
        let predictor = SymbolPredictor::new(PredictorConfig::from(&config.model));
        let ranking = RankingEngine::new(config.universe.benchmarks.clone(), config.report.top_n);
        let composer = ReportComposer::new(&config.report);

        Self {
            config,
            provider,
            calendar,
            history,
            publisher,
            predictor,
            ranking,
            composer,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fetch and predict one symbol
    pub async fn evaluate_symbol(
        &self,
        symbol: &str,
    ) -> std::result::Result<PredictionResult, SkipReason> {
        let series = self
            .provider
            .fetch_series(symbol, &self.config.data.lookback)
            .await
            .map_err(|e| SkipReason::Fetch(e.to_string()))?;

        self.predictor.predict(&series)
    }

    /// Evaluate the whole universe sequentially
    pub async fn evaluate_universe(&self) -> Evaluation {
        let mut evaluation = Evaluation::default();
        let symbols = self.config.universe.symbols();
        info!("Evaluating {} symbols from {}", symbols.len(), self.provider.name());

        for symbol in symbols {
            match self.evaluate_symbol(&symbol).await {
                Ok(result) => {
                    debug!("{}: {:+.2}%", symbol, result.predicted_pct());
                    evaluation.results.insert(result);
                }
                Err(reason) => {
                    warn!("Skipping {}: {}", symbol, reason);
                    evaluation.skipped.push((symbol, reason));
                }
            }
        }

        info!(
            "Evaluated {} symbols, skipped {} {:?}",
            evaluation.results.len(),
            evaluation.skipped.len(),
            evaluation.skip_counts()
        );
        evaluation
    }

    pub async fn run(&self, options: RunOptions) -> Result<RunOutcome> {
        let market = &self.config.universe.market;
        if options.force {
            info!("Calendar gate bypassed");
        } else if !self.calendar.is_trading_day(market, options.date) {
            info!("{} is not a trading day for {}, nothing to do", options.date, market);
            return Ok(RunOutcome::MarketClosed);
        }

        if !options.dry_run && self.publisher.is_none() {
            return Err(ReportError::MissingCredential("THREADS_TOKEN".into()));
        }

        let evaluation = self.evaluate_universe().await;
        if evaluation.results.is_empty() {
            error!(
                "No symbol produced a prediction, skipped {:?}",
                evaluation.skip_counts()
            );
            return Err(ReportError::InvalidData(
                "no symbol produced a prediction".into(),
            ));
        }

        let ranking = self.ranking.rank(&evaluation.results);
        let report = self.composer.compose(options.date, &ranking);
        info!(
            "Report for {}: {} picks, {} benchmarks, {} chars",
            options.date,
            report.discovery.len(),
            report.benchmarks.len(),
            report.char_count()
        );

        let (receipt, history_rows) = match (&self.publisher, options.dry_run) {
            (Some(publisher), false) => {
                let receipt = publisher.deliver(&report).await?;
                let records: Vec<HistoryRecord> = report
                    .entries()
                    .map(|r| HistoryRecord::unsettled(options.date, r))
                    .collect();
                let written = self.history.append(&records)?;
                (Some(receipt), written)
            }
            _ => {
                info!("Dry run, report not published");
                (None, 0)
            }
        };

        Ok(RunOutcome::Completed(Box::new(RunSummary {
            date: options.date,
            evaluation,
            ranking,
            report,
            receipt,
            history_rows,
        })))
    }
}
