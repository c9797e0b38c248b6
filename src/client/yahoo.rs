//! Yahoo Finance chart API client
//!
//! Fetches daily bars from `/v8/finance/chart/{symbol}`. Null quote fields
//! become NaN rather than removing the bar.

use super::MarketDataProvider;
use crate::error::{ReportError, Result};
use crate::types::{PricePoint, PriceSeries};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartEnvelope,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Yahoo Finance client for daily history
#[derive(Clone)]
pub struct YahooClient {
    http: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0")
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn to_series(symbol: &str, data: ChartData) -> Result<PriceSeries> {
        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

        // Null fields become NaN; the bar keeps its slot in the series
        let mut points: Vec<PricePoint> = data
            .timestamp
            .iter()
            .enumerate()
            .filter_map(|(i, &ts)| {
                let field = |v: &Vec<Option<f64>>| {
                    v.get(i).copied().flatten().unwrap_or(f64::NAN)
                };
                Some(PricePoint {
                    timestamp: Utc.timestamp_opt(ts, 0).single()?,
                    open: field(&quote.open),
                    high: field(&quote.high),
                    low: field(&quote.low),
                    close: field(&quote.close),
                    volume: field(&quote.volume),
                })
            })
            .collect();

        // An in-session bar can share the date of the last daily bar
        let n = points.len();
        if n >= 2 && points[n - 2].date() == points[n - 1].date() {
            debug!("{}: collapsing live bar on {}", symbol, points[n - 1].date());
            points.remove(n - 2);
        }

        PriceSeries::new(symbol, points).map_err(|e| ReportError::InvalidData(e.to_string()))
    }
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    async fn fetch_series(&self, symbol: &str, lookback: &str) -> Result<PriceSeries> {
        let url = format!("{}/v8/finance/chart/{}", self.base_url, symbol);
        let resp = self
            .http
            .get(&url)
            .query(&[("interval", "1d"), ("range", lookback)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ReportError::Api(format!("{} returned {}: {}", symbol, status, body)));
        }

        let chart: ChartResponse = resp.json().await?;
        if let Some(err) = chart.chart.error {
            return Err(ReportError::Api(format!("{}: {}", err.code, err.description)));
        }

        let data = chart
            .chart
            .result
            .and_then(|r| r.into_iter().next())
            .ok_or_else(|| ReportError::Api(format!("no chart data for {}", symbol)))?;

        let series = Self::to_series(symbol, data)?;
        debug!("Fetched {} bars for {}", series.len(), symbol);
        Ok(series)
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}
