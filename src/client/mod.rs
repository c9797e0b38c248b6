//! Market data clients

mod yahoo;


pub use yahoo::YahooClient;

use crate::error::Result;
use crate::types::PriceSeries;
use async_trait::async_trait;

/// Source of daily OHLCV history
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Time-ordered bars for `symbol` covering roughly `lookback`
    /// (a range string such as "2y"). May return fewer bars than asked.
    async fn fetch_series(&self, symbol: &str, lookback: &str) -> Result<PriceSeries>;

    /// Provider name for logging
    fn name(&self) -> &str;
}
