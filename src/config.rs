//! Command line and environment configuration

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::api::binance::BinanceClient;
use crate::utils::RefreshError;

pub const QUOTE_ASSET: &str = "BTC";
pub const NUM_SYMBOLS: usize = 12;
pub const NUM_DAYS: usize = 180;
pub const PRICE_CACHE_CAPACITY: usize = 1024;
pub const CACHE_TTL_SECONDS: u64 = 60 * 60;

/// Tool to produce plots of cryptocurrency price data.
///
/// Be careful to direct to a folder you don't mind losing: the previous
/// contents of the destination are removed once the new charts are written.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Folder to fill with charts [default: $HOME/Pictures]
    #[arg(short, long)]
    pub destination: Option<PathBuf>,

    /// Invert chart colours (for dark backgrounds)
    #[arg(short, long)]
    pub invert: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub destination: PathBuf,
    pub invert: bool,
    pub api_url: String,
    /// Per-run buffer directories are created under this
    pub buffer_root: PathBuf,
    pub quote_asset: String,
    pub num_symbols: usize,
    pub num_days: usize,
    pub price_cache_capacity: usize,
    pub cache_ttl: Duration,
}

impl Config {
    /// Merge CLI flags with environment (`HOME`, `BUZFU_API_URL`, `BUZFU_BUFFER_DIR`)
    pub fn from_cli(cli: Cli) -> Result<Self, RefreshError> {
        Self::from_cli_with_env(cli, |key| std::env::var(key).ok())
    }

    fn from_cli_with_env<F>(cli: Cli, env: F) -> Result<Self, RefreshError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let destination = match cli.destination {
            Some(path) => path,
            None => env("HOME")
                .map(|home| PathBuf::from(home).join("Pictures"))
                .ok_or_else(|| {
                    RefreshError::Config("HOME not set and no --destination given".to_string())
                })?,
        };

        let api_url = env("BUZFU_API_URL")
            .unwrap_or_else(|| BinanceClient::DEFAULT_BASE_URL.to_string());
        let buffer_root = env("BUZFU_BUFFER_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join("buzfu"));

        Ok(Self {
            destination,
            invert: cli.invert,
            api_url,
            buffer_root,
            quote_asset: QUOTE_ASSET.to_string(),
            num_symbols: NUM_SYMBOLS,
            num_days: NUM_DAYS,
            price_cache_capacity: PRICE_CACHE_CAPACITY,
            cache_ttl: Duration::from_secs(CACHE_TTL_SECONDS),
        })
    }
}
