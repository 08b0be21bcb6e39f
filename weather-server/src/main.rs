//! Binary crate for the `weather-server` HTTP service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments and loading configuration
//! - Wiring the forecast provider into the HTTP routes
//! - Logging and graceful shutdown

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
