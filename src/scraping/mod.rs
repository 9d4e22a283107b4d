pub mod base;
pub mod codechef_html;
pub mod codeforces_api;
pub mod leetcode_html;

use async_trait::async_trait;

use crate::config::AppConfig;
use crate::error::SourceError;
use crate::models::{self, Contest, Platform};

#[async_trait]
pub trait ContestSource: Send + Sync {
    fn platform(&self) -> Platform;
    fn source_url(&self) -> &str;

    /// One request to the source, normalized and filtered to upcoming contests.
    async fn fetch(&self) -> Result<Vec<Contest>, SourceError>;

    /// Like [`ContestSource::fetch`], but a source that cannot be read yields
    /// an empty list. The result is sorted by start time.
    async fn upcoming(&self) -> Vec<Contest> {
        match self.fetch().await {
            Ok(mut contests) => {
                models::sort_by_start(&mut contests);
                tracing::info!(
                    "{} upcoming contests retrieved from {}",
                    contests.len(),
                    self.platform()
                );
                contests
            }
            Err(err) => {
                tracing::warn!("{} unavailable, skipping: {err}", self.platform());
                Vec::new()
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct SourceInfo {
    pub id: String,
    pub name: String,
    pub url: String,
}

impl SourceInfo {
    pub fn of(source: &dyn ContestSource) -> Self {
        let platform = source.platform();
        Self {
            id: platform.id().to_string(),
            name: platform.name().to_string(),
            url: source.source_url().to_string(),
        }
    }
}

pub fn active_sources(config: &AppConfig) -> Result<Vec<Box<dyn ContestSource>>, SourceError> {
    Ok(vec![
        Box::new(codeforces_api::Codeforces::new(config)?),
        Box::new(leetcode_html::LeetCode::new(config)?),
        Box::new(codechef_html::CodeChef::new(config)?),
    ])
}
