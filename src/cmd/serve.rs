use std::{net::IpAddr, path::PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use crate::aggregator::Aggregator;
use crate::config::AppConfig;
use crate::server;

#[derive(Debug, Args)]
pub struct ServeArgs {
    #[arg(long)]
    host: Option<IpAddr>,
    #[arg(long)]
    port: Option<u16>,
    /// Directory holding index.html and the assets served under /static
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

pub async fn run(mut config: AppConfig, args: ServeArgs) -> Result<()> {
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(static_dir) = args.static_dir {
        config.static_dir = static_dir;
    }

    let aggregator = Aggregator::from_config(&config).with_context(|| {
        tracing::error!("couldn't create HTTP clients for the contest sources");
        "couldn't create HTTP clients for the contest sources"
    })?;
    let app = server::create_router(aggregator, config.static_dir.clone());

    let addr = config.bind_addr();
    tracing::info!("Server start at {addr}");
    axum::Server::try_bind(&addr)
        .with_context(|| format!("failed to bind {addr}"))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(server::shutdown_signal())
        .await
        .context("server terminated with an error")?;

    Ok(())
}
