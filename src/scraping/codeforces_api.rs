use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use reqwest::{header::HeaderMap, Client};
use serde::Deserialize;

use super::base;
use super::ContestSource;
use crate::config::AppConfig;
use crate::error::{EntryError, SourceError};
use crate::models::{Contest, Platform};

const CONTEST_URL: &str = "https://codeforces.com/contest/";
const PHASE_BEFORE: &str = "BEFORE";

#[derive(Debug, Deserialize)]
struct ContestListResponse {
    status: String,
    comment: Option<String>,
    #[serde(default)]
    result: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContestEntry {
    id: u64,
    name: String,
    phase: String,
    duration_seconds: i64,
    start_time_seconds: Option<i64>,
}

pub struct Codeforces {
    url: String,
    client: Client,
}

impl Codeforces {
    pub fn new(config: &AppConfig) -> Result<Self, SourceError> {
        Ok(Self {
            url: config.codeforces_api_url.clone(),
            client: base::build_client(config)?,
        })
    }
}

#[async_trait]
impl ContestSource for Codeforces {
    fn platform(&self) -> Platform {
        Platform::Codeforces
    }

    fn source_url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<Contest>, SourceError> {
        tracing::info!("Retrieving contest list from the Codeforces API");
        let body = base::fetch_text(&self.client, &self.url, HeaderMap::new()).await?;
        parse_payload(&body, Utc::now())
    }
}

pub(crate) fn parse_payload(body: &str, now: DateTime<Utc>) -> Result<Vec<Contest>, SourceError> {
    let response: ContestListResponse =
        serde_json::from_str(body).map_err(|err| SourceError::Payload(err.to_string()))?;

    if response.status != "OK" {
        let comment = response.comment.unwrap_or_default();
        tracing::error!("Codeforces API error: {comment}");
        return Err(SourceError::Api(comment));
    }

    let mut contests = Vec::new();
    for (i, value) in response.result.into_iter().enumerate() {
        let entry = match decode_entry(value) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("skipping Codeforces entry {i}: {err}");
                continue;
            }
        };
        if entry.phase != PHASE_BEFORE {
            continue;
        }
        match to_contest(&entry) {
            Ok(contest) if base::is_upcoming(contest.start_time, now) => contests.push(contest),
            Ok(_) => {}
            Err(err) => tracing::warn!("skipping Codeforces contest {}: {err}", entry.id),
        }
    }

    Ok(contests)
}

// A malformed entry only loses itself.
fn decode_entry(value: serde_json::Value) -> Result<ContestEntry, EntryError> {
    serde_json::from_value(value).map_err(|err| EntryError::Malformed(err.to_string()))
}

fn to_contest(entry: &ContestEntry) -> Result<Contest, EntryError> {
    if entry.name.trim().is_empty() {
        return Err(EntryError::Missing("name"));
    }
    let seconds = entry
        .start_time_seconds
        .ok_or(EntryError::Missing("startTimeSeconds"))?;
    let start_time = Utc
        .timestamp_opt(seconds, 0)
        .single()
        .ok_or_else(|| EntryError::Time(seconds.to_string()))?;
    let duration_seconds = u64::try_from(entry.duration_seconds)
        .map_err(|_| EntryError::NegativeDuration(entry.duration_seconds))?;

    Ok(Contest {
        name: entry.name.clone(),
        platform: Platform::Codeforces,
        start_time,
        duration_seconds,
        url: format!("{CONTEST_URL}{}", entry.id),
    })
}
