use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod models;
mod services;
mod utils;

use api::binance::BinanceClient;
use config::{Cli, Config};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("buzfu=info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let cli = Cli::parse();
    let config = match Config::from_cli(cli) {
        Ok(c) => c,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Refreshing {} with {} charts{}",
        config.destination.display(),
        config.num_symbols,
        if config.invert { " (inverted)" } else { "" }
    );

    let client = BinanceClient::with_base_url(config.api_url.clone());
    let mut rng = rand::thread_rng();

    match services::refresh_service::run(&config, &client, &mut rng).await {
        Ok(written) => info!("Done, {} charts in place", written.len()),
        Err(e) => {
            error!("Refresh failed, destination left as it was: {}", e);
            std::process::exit(1);
        }
    }
}
