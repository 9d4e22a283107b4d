use anyhow::{Context, Result};
use clap::Args;

use crate::aggregator::Aggregator;
use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// codeforces, leetcode or codechef (any case). All platforms when omitted.
    platform: Option<String>,
}

pub async fn run(config: AppConfig, args: FetchArgs) -> Result<()> {
    let aggregator = Aggregator::from_config(&config)
        .context("couldn't create HTTP clients for the contest sources")?;

    let contests = match args.platform {
        Some(name) => aggregator.by_source(&name).await?,
        None => aggregator.all().await,
    };

    println!("{}", serde_json::to_string_pretty(&contests)?);
    Ok(())
}
