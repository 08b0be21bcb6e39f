use anyhow::Context;
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};

use weather_core::{Config, provider_from_config};

use crate::routes::{self, AppState};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-server", version, about = "Hourly Tokyo temperature forecast over HTTP")]
pub struct Cli {
    /// Path to a TOML config file. Defaults to the platform config directory.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Address to listen on, e.g. "0.0.0.0:8000". Overrides `bind` from the config file.
    #[arg(long)]
    pub bind: Option<String>,
}

impl Cli {
    /// Resolve the effective configuration: file (or defaults), then flags.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load()?,
        };

        if let Some(bind) = &self.bind {
            config.bind = bind.clone();
        }

        Ok(config)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let config = self.load_config()?;

        let addr: SocketAddr = config
            .bind
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", config.bind))?;

        let provider = provider_from_config(&config).context("Failed to set up forecast provider")?;
        let app = routes::router(AppState { provider });

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        tracing::info!(
            upstream = %config.upstream.base_url,
            "Weather backend listening on http://{addr}"
        );

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("HTTP server failed")?;

        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received, gracefully stopping"),
        Err(e) => {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    }
}
