//! Price series models

use chrono::{DateTime, Utc};

/// A single observation: candle close time (shifted by 1 ms) and close price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Chronological daily closes for one trading pair
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    pub symbol: String,
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }
}
