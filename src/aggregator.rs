use futures::future::join_all;

use crate::config::AppConfig;
use crate::error::{QueryError, SourceError};
use crate::models::{self, Contest, Platform};
use crate::scraping::{self, ContestSource, SourceInfo};

/// Merges the contest sources into one time-ordered listing.
pub struct Aggregator {
    sources: Vec<Box<dyn ContestSource>>,
}

impl Aggregator {
    pub fn new(sources: Vec<Box<dyn ContestSource>>) -> Self {
        Self { sources }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, SourceError> {
        Ok(Self::new(scraping::active_sources(config)?))
    }

    pub fn sources(&self) -> Vec<SourceInfo> {
        self.sources
            .iter()
            .map(|source| SourceInfo::of(source.as_ref()))
            .collect()
    }

    /// Every source is queried concurrently; one that fails contributes nothing.
    pub async fn all(&self) -> Vec<Contest> {
        let results = join_all(self.sources.iter().map(|source| source.upcoming())).await;
        let mut contests: Vec<Contest> = results.into_iter().flatten().collect();
        models::sort_by_start(&mut contests);
        contests
    }

    /// Looks the source up by its case-insensitive identifier.
    pub async fn by_source(&self, name: &str) -> Result<Vec<Contest>, QueryError> {
        let platform: Platform = name.parse()?;
        Ok(self.by_platform(platform).await)
    }

    pub async fn by_platform(&self, platform: Platform) -> Vec<Contest> {
        match self
            .sources
            .iter()
            .find(|source| source.platform() == platform)
        {
            Some(source) => source.upcoming().await,
            None => {
                tracing::debug!("no source registered for {platform}");
                Vec::new()
            }
        }
    }
}
