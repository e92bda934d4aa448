use std::path::PathBuf;

use rand::Rng;
use tracing::{debug, info};

use crate::api::MarketData;
use crate::config::Config;
use crate::services::catalog_service::{sample_symbols, SymbolCatalogFetcher};
use crate::services::chart_service::{normalize_window, render_chart};
use crate::services::output_service::{remove_previous, snapshot_destination, OutputWriter};
use crate::services::price_service::PriceSeriesFetcher;
use crate::utils::{Clock, RefreshError};

/// Replace the destination's contents with freshly drawn charts.
///
/// Previous files are only deleted once every new chart is in place; any
/// error before that leaves the destination's old contents alone.
pub async fn run<M, R>(config: &Config, market: &M, rng: &mut R) -> Result<Vec<PathBuf>, RefreshError>
where
    M: MarketData,
    R: Rng + ?Sized,
{
    let mut catalog = SymbolCatalogFetcher::new(&config.quote_asset, config.cache_ttl);
    let mut prices = PriceSeriesFetcher::new(config.price_cache_capacity, config.cache_ttl);
    run_with(config, market, &mut catalog, &mut prices, rng).await
}

/// Same as [`run`], with caller-owned fetchers (and their caches)
pub async fn run_with<M, R, C1, C2>(
    config: &Config,
    market: &M,
    catalog: &mut SymbolCatalogFetcher<C1>,
    prices: &mut PriceSeriesFetcher<C2>,
    rng: &mut R,
) -> Result<Vec<PathBuf>, RefreshError>
where
    M: MarketData,
    R: Rng + ?Sized,
    C1: Clock,
    C2: Clock,
{
    let previous = snapshot_destination(&config.destination)?;
    info!(
        "{} existing files in {}",
        previous.len(),
        config.destination.display()
    );

    let symbols = catalog.get_symbols(market).await?;
    let chosen = sample_symbols(&symbols, config.num_symbols, rng)?;
    info!("Chosen: {}", chosen.join(", "));

    let writer = OutputWriter::new(&config.buffer_root);
    debug!("Buffering charts in {}", writer.buffer_dir().display());
    let mut written = Vec::with_capacity(chosen.len());

    for symbol in &chosen {
        let series = prices.get_prices(market, symbol).await?;
        let window = normalize_window(&series, config.num_days, &config.quote_asset)?;
        let chart = render_chart(&window)?;
        written.push(writer.write(symbol, &chart, &config.destination, config.invert)?);
    }

    let removed = remove_previous(&previous, &written)?;
    writer.cleanup()?;
    info!("Wrote {} charts, removed {} old files", written.len(), removed);

    Ok(written)
}
