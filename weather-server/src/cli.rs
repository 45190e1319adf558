use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::{Parser, Subcommand};
use weather_core::{
    Config, FileHistory, HistoryStore, MemoryCache, MemoryHistory, WeatherService,
    config::API_KEY_ENV, provider::provider_from_config,
};

use crate::api;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Weather proxy HTTP server")]
pub struct Cli {
    /// Path to the TOML config file. Defaults to the platform config directory.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default).
    Serve {
        /// Address to bind, e.g. "0.0.0.0:8000".
        #[arg(long)]
        bind: Option<String>,

        /// JSON-lines file backing the search history; in-memory when absent.
        #[arg(long)]
        history_file: Option<PathBuf>,
    },

    /// Store the OpenWeather API key in the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let path = match self.config {
            Some(path) => path,
            None => Config::config_file_path()?,
        };

        match self.command.unwrap_or(Command::Serve { bind: None, history_file: None }) {
            Command::Serve { bind, history_file } => {
                let mut config = Config::load_from(&path)?.with_env();
                if let Some(bind) = bind {
                    config.bind = bind;
                }
                if history_file.is_some() {
                    config.history_path = history_file;
                }
                serve(config).await
            }
            Command::Configure => configure(&path),
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    if config.api_key().is_none() {
        tracing::warn!(
            "no API key configured; set {API_KEY_ENV} or run `weather-server configure`. \
             Weather lookups will fail until one is provided"
        );
    }

    let provider = provider_from_config(&config)?;

    let history: Arc<dyn HistoryStore> = match &config.history_path {
        Some(path) => {
            let store = FileHistory::open(path)
                .await
                .with_context(|| format!("Failed to open history file: {}", path.display()))?;
            tracing::info!(path = %store.path().display(), "using file-backed search history");
            Arc::new(store)
        }
        None => Arc::new(MemoryHistory::new()),
    };

    let service = WeatherService::new(provider, Arc::new(MemoryCache::new()), history)
        .with_ttl(config.cache_ttl())
        .with_history_limit(config.history_limit);

    let app = api::router(Arc::new(service));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!(addr = %listener.local_addr()?, "weather server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    tracing::info!("weather server stopped");
    Ok(())
}

fn configure(path: &std::path::Path) -> anyhow::Result<()> {
    let mut config = Config::load_from(path)?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_display_mode(inquire::PasswordDisplayMode::Masked)
        .prompt()
        .context("Failed to read API key")?;

    config = config.with_api_key_override(Some(api_key));
    if config.api_key().is_none() {
        anyhow::bail!("API key must not be empty");
    }

    config.save_to(path)?;
    println!("Saved configuration to {}", path.display());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
