//! Length-bounded report rendering
//!
//! Length is counted in Unicode scalar values. When a report is too long it is
//! shortened by whole pieces only, in this order: promotional footer,
//! disclaimer footer, discovery entries from the bottom, benchmark entries
//! from the bottom.

use crate::config::ReportConfig;
use crate::ranking::Ranking;
use crate::types::PredictionResult;
use chrono::NaiveDate;
use tracing::debug;

const DISCOVERY_HEADING: &str = "Top picks (5d)";
const BENCHMARK_HEADING: &str = "Benchmarks";

/// Rendered-on-demand report
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub date: NaiveDate,
    pub title: String,
    pub discovery: Vec<PredictionResult>,
    pub benchmarks: Vec<PredictionResult>,
    pub disclaimer: Option<String>,
    /// Promotional/link footer
    pub promo: Option<String>,
    pub max_chars: usize,
}

impl Report {
    pub fn render(&self) -> String {
        let mut sections: Vec<String> = vec![self.header()];

        if !self.discovery.is_empty() {
            let mut lines = vec![DISCOVERY_HEADING.to_string()];
            lines.extend(
                self.discovery
                    .iter()
                    .enumerate()
                    .map(|(i, r)| discovery_line(i + 1, r)),
            );
            sections.push(lines.join("\n"));
        }

        if !self.benchmarks.is_empty() {
            let mut lines = vec![BENCHMARK_HEADING.to_string()];
            lines.extend(self.benchmarks.iter().map(benchmark_line));
            sections.push(lines.join("\n"));
        }

        let footer: Vec<&str> = [self.disclaimer.as_deref(), self.promo.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !footer.is_empty() {
            sections.push(footer.join("\n"));
        }

        sections.join("\n\n")
    }

    /// Entries still in the report, discovery first
    pub fn entries(&self) -> impl Iterator<Item = &PredictionResult> {
        self.discovery.iter().chain(self.benchmarks.iter())
    }

    pub fn char_count(&self) -> usize {
        self.render().chars().count()
    }

    pub fn fits(&self) -> bool {
        self.char_count() <= self.max_chars
    }

    /// Same report without promotional content
    pub fn degraded(&self) -> Report {
        Report {
            promo: None,
            ..self.clone()
        }
    }

    fn header(&self) -> String {
        format!("{} {}", self.title, self.date.format("%Y-%m-%d"))
    }

    /// Drop whole pieces until the rendered text fits `max_chars`
    pub fn fit(mut self) -> Report {
        while !self.fits() {
            if self.promo.take().is_some() {
                debug!("Report over limit, dropped promo footer");
            } else if self.disclaimer.take().is_some() {
                debug!("Report over limit, dropped disclaimer");
            } else if let Some(r) = self.discovery.pop() {
                debug!("Report over limit, dropped discovery entry {}", r.symbol);
            } else if let Some(r) = self.benchmarks.pop() {
                debug!("Report over limit, dropped benchmark entry {}", r.symbol);
            } else {
                // Only the header is left
                let date_len = self.date.format("%Y-%m-%d").to_string().chars().count();
                let keep = self.max_chars.saturating_sub(date_len + 1);
                self.title = self.title.chars().take(keep).collect();
                break;
            }
        }
        self
    }
}

fn discovery_line(rank: usize, r: &PredictionResult) -> String {
    let mut line = format!(
        "{}. {} {:+.2}% | {:.2}",
        rank,
        r.symbol,
        r.predicted_pct(),
        r.last_close
    );
    if let Some(support) = r.support() {
        line.push_str(&format!(" | S {:.1}", support));
    }
    line
}

fn benchmark_line(r: &PredictionResult) -> String {
    format!("{} {:+.2}% | {:.2}", r.symbol, r.predicted_pct(), r.last_close)
}

/// Builds reports from rankings
#[derive(Debug, Clone)]
pub struct ReportComposer {
    title: String,
    disclaimer: Option<String>,
    promo: Option<String>,
    max_chars: usize,
}

impl ReportComposer {
    pub fn new(config: &ReportConfig) -> Self {
        Self {
            title: config.title.clone(),
            disclaimer: config.disclaimer.clone(),
            promo: config.promo.clone(),
            max_chars: config.max_chars,
        }
    }

    /// Report for `date` that already fits the length limit
    pub fn compose(&self, date: NaiveDate, ranking: &Ranking) -> Report {
        Report {
            date,
            title: self.title.clone(),
            discovery: ranking.discovery.clone(),
            benchmarks: ranking.benchmarks.clone(),
            disclaimer: self.disclaimer.clone(),
            promo: self.promo.clone(),
            max_chars: self.max_chars,
        }
        .fit()
    }
}

#[cfg(test)]
mod tests;
