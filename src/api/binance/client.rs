use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use super::models::{ApiError, ErrorResponse, ExchangeInfo, RawKline};
use crate::api::MarketData;
use tracing::{debug, warn};

/// Public Binance spot REST client. No authentication, read-only.
pub struct BinanceClient {
    http_client: HttpClient,
    base_url: String,
}

impl BinanceClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.binance.com/api/v3";

    /// Create a new client against `base_url` (production, a mirror or testnet)
    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Turn a failed response into an error, pulling the exchange's `msg` if present
    async fn handle_error_response(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let body_text = response.text().await.unwrap_or_default();

        let message = serde_json::from_str::<ErrorResponse>(&body_text)
            .ok()
            .and_then(|err| err.msg)
            .unwrap_or(body_text);

        warn!("Exchange returned {}: {}", status, message);
        ApiError::HttpError { status, message }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self.http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| ApiError::RequestError(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::handle_error_response(response).await);
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::DeserializationError(format!("Failed to parse response: {}", e)))
    }
}

impl MarketData for BinanceClient {
    /// GET /exchangeInfo
    async fn exchange_info(&self) -> Result<ExchangeInfo, ApiError> {
        self.get_json("exchangeInfo", &[]).await
    }

    /// GET /klines
    ///
    /// # Arguments
    /// * `symbol` - Trading pair (e.g., "ETHBTC")
    /// * `interval` - Candle interval (e.g., "1d")
    /// * `limit` - Number of most recent candles (max 1000)
    async fn klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<RawKline>, ApiError> {
        let query = [
            ("symbol", symbol.to_string()),
            ("interval", interval.to_string()),
            ("limit", limit.to_string()),
        ];
        self.get_json("klines", &query).await
    }
}
