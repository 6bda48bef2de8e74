//! offgrid command-line front-end.
//!
//! Runs single requests through the offline-first engine and drives the
//! generation lifecycle against the configured cache database. Logs go to
//! stderr; set `RUST_LOG=offgrid_core=debug` to see cache hits and misses.

use anyhow::Result;
use clap::{Parser, Subcommand};
use offgrid_core::AppConfig;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;

use context::Context;

#[derive(Parser, Debug)]
#[command(name = "offgrid")]
#[command(about = "Offline-first request cache")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch a URL through the engine and print the body
    Fetch(commands::fetch::Args),
    /// Fetch the precache manifest into the asset generation
    Install(commands::install::Args),
    /// Delete generations that do not belong to the configured version
    Activate,
    /// List generations with entry counts
    Generations,
    /// List the request identities stored in a generation
    Keys(commands::keys::Args),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load()?;
    let ctx = Context::open(&config).await?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Fetch(args) => commands::fetch::run(&ctx, args, &mut out).await,
        Commands::Install(args) => commands::install::run(&ctx, args, &mut out).await,
        Commands::Activate => commands::activate::run(&ctx, &mut out).await,
        Commands::Generations => commands::generations::run(&ctx, &mut out).await,
        Commands::Keys(args) => commands::keys::run(&ctx, args, &mut out).await,
    }
}
