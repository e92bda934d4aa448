use std::collections::HashSet;
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::api::binance::SymbolInfo;
use crate::api::MarketData;
use crate::utils::{Clock, RefreshError, SystemClock, TtlCache};

/// Base asset substrings marking leveraged tokens (e.g. ETHUP, BNBDOWN)
pub const LEVERAGED_MARKERS: [&str; 2] = ["UP", "DOWN"];

/// Symbols quoted in `quote_asset`, leveraged tokens excluded
pub fn filter_symbols(entries: &[SymbolInfo], quote_asset: &str) -> HashSet<String> {
    entries
        .iter()
        .filter(|entry| entry.quote_asset == quote_asset)
        .filter(|entry| {
            !LEVERAGED_MARKERS
                .iter()
                .any(|marker| entry.base_asset.contains(marker))
        })
        .map(|entry| entry.symbol.clone())
        .collect()
}

/// Draw `count` distinct symbols. Fails instead of returning a short sample.
pub fn sample_symbols<R: Rng + ?Sized>(
    catalog: &HashSet<String>,
    count: usize,
    rng: &mut R,
) -> Result<Vec<String>, RefreshError> {
    if catalog.len() < count {
        return Err(RefreshError::InsufficientSymbols {
            requested: count,
            available: catalog.len(),
        });
    }

    // Sorted so a seeded rng gives the same draw every time
    let mut candidates: Vec<&String> = catalog.iter().collect();
    candidates.sort();

    Ok(candidates
        .choose_multiple(rng, count)
        .map(|symbol| (*symbol).clone())
        .collect())
}

/// Fetches the tradable symbol set, cached for one freshness window
pub struct SymbolCatalogFetcher<C: Clock = SystemClock> {
    quote_asset: String,
    cache: TtlCache<(), HashSet<String>, C>,
}

impl SymbolCatalogFetcher<SystemClock> {
    pub fn new(quote_asset: &str, ttl: Duration) -> Self {
        Self::with_cache(quote_asset, TtlCache::new(1, ttl))
    }
}

impl<C: Clock> SymbolCatalogFetcher<C> {
    pub fn with_cache(quote_asset: &str, cache: TtlCache<(), HashSet<String>, C>) -> Self {
        Self {
            quote_asset: quote_asset.to_string(),
            cache,
        }
    }

    pub async fn get_symbols<M: MarketData>(
        &mut self,
        market: &M,
    ) -> Result<HashSet<String>, RefreshError> {
        if let Some(symbols) = self.cache.get(&()) {
            debug!("Symbol catalog cache hit ({} symbols)", symbols.len());
            return Ok(symbols);
        }

        let info = market.exchange_info().await?;
        let symbols = filter_symbols(&info.symbols, &self.quote_asset);
        info!(
            "Fetched {} instruments, {} usable {} pairs",
            info.symbols.len(),
            symbols.len(),
            self.quote_asset
        );

        self.cache.insert((), symbols.clone());
        Ok(symbols)
    }
}
