use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Response from GET /exchangeInfo (only the parts we read)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeInfo {
    pub symbols: Vec<SymbolInfo>,
}

/// One tradable instrument
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolInfo {
    pub symbol: String,
    pub base_asset: String,
    pub quote_asset: String,
}

/// A kline row as sent by the exchange: a positional array of
/// `[open_time, open, high, low, close, volume, close_time, ...]`
pub type RawKline = Vec<serde_json::Value>;

/// Error response body from the API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: Option<i64>,
    pub msg: Option<String>,
}

/// Errors from talking to the exchange
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success HTTP status
    #[error("HTTP Error ({status}): {message}")]
    HttpError { status: u16, message: String },
    /// Network/request error
    #[error("Request Error: {0}")]
    RequestError(String),
    /// Body did not match the expected shape
    #[error("Deserialization Error: {0}")]
    DeserializationError(String),
}
