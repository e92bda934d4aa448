use std::path::PathBuf;
use thiserror::Error;

use crate::api::binance::ApiError;

/// Everything that can abort a wallpaper refresh
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("Exchange API error: {0}")]
    Api(#[from] ApiError),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Cannot sample {requested} symbols from a catalog of {available}")]
    InsufficientSymbols { requested: usize, available: usize },
    #[error("Malformed candle #{index} for {symbol}: {reason}")]
    MalformedCandle {
        symbol: String,
        index: usize,
        reason: String,
    },
    #[error("No price data for {0}")]
    EmptySeries(String),
    #[error("Failed to render chart: {0}")]
    Render(String),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Filesystem error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RefreshError {
    /// Attach the offending path to an io error
    pub fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| RefreshError::Io { path, source }
    }
}
