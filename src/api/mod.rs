pub mod binance;

use binance::{ApiError, ExchangeInfo, RawKline};

/// Read-only market data the refresh pipeline needs from an exchange
#[allow(async_fn_in_trait)]
pub trait MarketData {
    /// Listing of every instrument the exchange trades
    async fn exchange_info(&self) -> Result<ExchangeInfo, ApiError>;

    /// Most recent `limit` candles of `interval` for `symbol`, oldest first
    async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<RawKline>, ApiError>;
}
