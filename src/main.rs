#![warn(clippy::all, clippy::pedantic)]

use anyhow::{Context, Result};
use clap::Parser;
use nekorelay::Config;
use nekorelay::cli::commands::Cli;
use std::sync::Arc;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_init()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.observability.tracing_level())
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("set default subscriber")?;

    nekorelay::app::dispatch::dispatch(cli, Arc::new(config)).await
}
