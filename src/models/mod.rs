//! Data models for the refresh pipeline

pub mod chart;
pub mod price;

pub use chart::NormalizedWindow;
pub use price::{PricePoint, PriceSeries};
