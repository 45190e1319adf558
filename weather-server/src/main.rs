//! Binary crate for the `weather-server` HTTP service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and loading configuration
//! - Logging setup
//! - Routing HTTP requests into `weather_core::WeatherService`

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod api;
mod cli;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("weather_core=info,weather_server=info,warn"));

    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
