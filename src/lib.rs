pub mod aggregator;
mod cmd;
pub mod config;
pub mod error;
pub mod models;
pub mod scraping;
pub mod server;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::runtime::Builder;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use cmd::{fetch::FetchArgs, serve::ServeArgs};
use config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "contest-scrape")]
#[command(about = "Upcoming contests from Codeforces, LeetCode and CodeChef")]
struct Cli {
    /// JSON config file; environment variables override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Serve the contest listing over HTTP
    Serve(ServeArgs),
    /// Print upcoming contests as JSON
    Fetch(FetchArgs),
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_target(true)
        .with_ansi(false)
        .with_thread_ids(true);
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(format)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")
}

pub fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("couldn't load configuration")?;

    let runtime = Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;

    match cli.command {
        Commands::Serve(args) => runtime.block_on(cmd::serve::run(config, args)),
        Commands::Fetch(args) => runtime.block_on(cmd::fetch::run(config, args)),
    }
}
