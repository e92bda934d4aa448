use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde_json::Value;
use tracing::debug;

use crate::api::binance::RawKline;
use crate::api::MarketData;
use crate::models::{PricePoint, PriceSeries};
use crate::utils::{Clock, RefreshError, SystemClock, TtlCache};

pub const KLINE_INTERVAL: &str = "1d";
pub const KLINE_LIMIT: u32 = 1000;

const CLOSE_PRICE_INDEX: usize = 4;
const CLOSE_TIME_INDEX: usize = 6;

/// Build a price series from raw kline rows, keeping their order.
///
/// Each point is `(close_time + 1ms, close_price)`.
pub fn make_series(symbol: &str, rows: &[RawKline]) -> Result<PriceSeries, RefreshError> {
    let malformed = |index: usize, reason: String| RefreshError::MalformedCandle {
        symbol: symbol.to_string(),
        index,
        reason,
    };

    let mut points = Vec::with_capacity(rows.len());

    for (index, row) in rows.iter().enumerate() {
        let price_field = row
            .get(CLOSE_PRICE_INDEX)
            .ok_or_else(|| malformed(index, format!("{} fields, no close price", row.len())))?;
        let time_field = row
            .get(CLOSE_TIME_INDEX)
            .ok_or_else(|| malformed(index, format!("{} fields, no close time", row.len())))?;

        let price = parse_price(price_field)
            .ok_or_else(|| malformed(index, format!("bad close price {}", price_field)))?;
        let close_time_ms = time_field
            .as_i64()
            .ok_or_else(|| malformed(index, format!("bad close time {}", time_field)))?;
        let close_time = DateTime::<Utc>::from_timestamp_millis(close_time_ms)
            .ok_or_else(|| malformed(index, format!("close time {} out of range", close_time_ms)))?;

        points.push(PricePoint {
            timestamp: close_time + ChronoDuration::milliseconds(1),
            price,
        });
    }

    Ok(PriceSeries {
        symbol: symbol.to_string(),
        points,
    })
}

/// Prices come as decimal strings, but accept plain numbers too
fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

/// Fetches daily candle history per symbol, cached per symbol
pub struct PriceSeriesFetcher<C: Clock = SystemClock> {
    cache: TtlCache<String, PriceSeries, C>,
}

impl PriceSeriesFetcher<SystemClock> {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self::with_cache(TtlCache::new(capacity, ttl))
    }
}

impl<C: Clock> PriceSeriesFetcher<C> {
    pub fn with_cache(cache: TtlCache<String, PriceSeries, C>) -> Self {
        Self { cache }
    }

    pub async fn get_prices<M: MarketData>(
        &mut self,
        market: &M,
        symbol: &str,
    ) -> Result<PriceSeries, RefreshError> {
        let key = symbol.to_string();
        if let Some(series) = self.cache.get(&key) {
            debug!("Price cache hit for {}", symbol);
            return Ok(series);
        }

        let rows = market.klines(symbol, KLINE_INTERVAL, KLINE_LIMIT).await?;
        let series = make_series(symbol, &rows)?;
        self.cache.insert(key, series.clone());
        debug!(
            "Fetched {} daily candles for {} ({} series cached)",
            series.len(),
            symbol,
            self.cache.len()
        );
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tests::{kline_row, FakeMarket};
    use serde_json::json;

    #[test]
    fn test_series_shifts_close_time_by_one_ms() {
        let rows = vec![
            kline_row(1_704_153_599_999, "0.052"),
            kline_row(1_704_239_999_999, "0.053"),
        ];

        let series = make_series("ETHBTC", &rows).expect("series");
        assert_eq!(series.symbol, "ETHBTC");
        assert_eq!(series.points[0].timestamp.timestamp_millis(), 1_704_153_600_000);
        assert_eq!(series.points[1].timestamp.timestamp_millis(), 1_704_240_000_000);
        assert_eq!(series.points[0].price, 0.052);
        assert_eq!(series.points[1].price, 0.053);
    }

    #[test]
    fn test_series_keeps_source_order() {
        let rows: Vec<RawKline> = (0..5)
            .map(|day| kline_row(86_400_000 * (day + 1) - 1, &format!("{}", day + 1)))
            .collect();

        let series = make_series("ETHBTC", &rows).expect("series");
        let prices: Vec<f64> = series.points.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert!(series.points.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    }

    #[test]
    fn test_numeric_price_accepted() {
        let rows = vec![vec![json!(0), json!(1), json!(1), json!(1), json!(0.5), json!(1), json!(99)]];
        let series = make_series("ETHBTC", &rows).expect("series");
        assert_eq!(series.points[0].price, 0.5);
        assert_eq!(series.points[0].timestamp.timestamp_millis(), 100);
    }

    #[test]
    fn test_short_row_is_malformed() {
        let rows = vec![vec![json!(0), json!("1"), json!("1")]];
        match make_series("ETHBTC", &rows) {
            Err(RefreshError::MalformedCandle { symbol, index, .. }) => {
                assert_eq!(symbol, "ETHBTC");
                assert_eq!(index, 0);
            }
            other => panic!("expected MalformedCandle, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_price_is_malformed() {
        let rows = vec![kline_row(1000, "0.1"), kline_row(2000, "n/a")];
        assert!(matches!(
            make_series("ETHBTC", &rows),
            Err(RefreshError::MalformedCandle { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_cached_series_not_shifted_again() {
        let market = FakeMarket::with_symbols(&[("ETHBTC", "ETH", "BTC")])
            .with_klines("ETHBTC", vec![kline_row(1_704_153_599_999, "0.05")]);
        let mut fetcher = PriceSeriesFetcher::new(1024, Duration::from_secs(3600));

        let first = fetcher.get_prices(&market, "ETHBTC").await.expect("first");
        let second = fetcher.get_prices(&market, "ETHBTC").await.expect("second");

        assert_eq!(market.kline_calls(), 1);
        assert_eq!(first, second);
        assert_eq!(second.points[0].timestamp.timestamp_millis(), 1_704_153_600_000);
    }

    #[tokio::test]
    async fn test_zero_capacity_cache_always_fetches() {
        let market = FakeMarket::with_symbols(&[("ETHBTC", "ETH", "BTC")])
            .with_klines("ETHBTC", vec![kline_row(1000, "1")]);
        let mut fetcher = PriceSeriesFetcher::new(0, Duration::from_secs(3600));

        fetcher.get_prices(&market, "ETHBTC").await.expect("first");
        fetcher.get_prices(&market, "ETHBTC").await.expect("second");
        assert_eq!(market.kline_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_kline_request_is_an_error() {
        let market = FakeMarket::failing();
        let mut fetcher = PriceSeriesFetcher::new(1024, Duration::from_secs(3600));

        let result = fetcher.get_prices(&market, "ETHBTC").await;
        assert!(matches!(result, Err(RefreshError::Api(_))));
    }
}
