//! hetzner CLI
//!
//! Command-line client for the Hetzner Cloud, Robot and Auction APIs

use clap::Parser;
use color_eyre::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;
mod credentials;
mod output;

use cli::Cli;
use commands::Context;
use config::{CONFIG_ENV, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();

    // Logs go to stderr so stdout stays parseable
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config_path =
        Config::resolve_path(cli.config.as_deref(), credentials::process_env(CONFIG_ENV));
    let config = Config::load_or_default(config_path.as_deref())?;

    let ctx = Context::new(config, config_path, cli.auth, cli.output);
    commands::run(cli.command, &ctx).await
}
