//! Chart generation models

use super::price::PricePoint;

const SUMMARY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Trailing slice of a price series rescaled so the last value is exactly 1.0
#[derive(Debug, Clone)]
pub struct NormalizedWindow {
    pub symbol: String,
    pub quote_asset: String,
    pub points: Vec<PricePoint>,
}

impl NormalizedWindow {
    /// Symbol with the quote asset suffix stripped, e.g. "ETHBTC" -> "ETH"
    pub fn base_asset(&self) -> &str {
        self.symbol
            .strip_suffix(self.quote_asset.as_str())
            .unwrap_or(&self.symbol)
    }

    /// Text block drawn in the corner of the chart
    pub fn summary(&self) -> String {
        let format_time = |point: Option<&PricePoint>| {
            point
                .map(|p| p.timestamp.format(SUMMARY_TIME_FORMAT).to_string())
                .unwrap_or_else(|| "-".to_string())
        };

        format!(
            "Asset: {} ({})\nDays: {}\nSince: {}\nUntil: {}",
            self.base_asset(),
            self.symbol,
            self.points.len(),
            format_time(self.points.first()),
            format_time(self.points.last()),
        )
    }
}
