use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use reqwest::{header::HeaderMap, Client};
use scraper::{ElementRef, Html, Selector};

use super::base;
use super::ContestSource;
use crate::config::AppConfig;
use crate::error::{EntryError, SourceError};
use crate::models::{Contest, Platform};

const TIMEZONE: Tz = chrono_tz::America::Los_Angeles;
const TIME_FORMAT: &str = "%b %d, %Y %I:%M %p";
const ZONE_ABBREVIATIONS: [&str; 2] = ["PDT", "PST"];

// The listing rejects requests that don't look like a browser. Accept-Encoding is
// negotiated by the client itself.
const BROWSER_HEADERS: [(&str, &str); 5] = [
    ("user-agent", "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36"),
    ("accept-language", "en-US,en;q=0.9"),
    ("accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7"),
    ("connection", "keep-alive"),
    ("upgrade-insecure-requests", "1"),
];

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("leetcode selector")
}

// Current markup first, then the older hashed class names.
static CARD_SELECTORS: Lazy<[Selector; 2]> = Lazy::new(|| {
    [
        selector(r#"div[class*="contest-card__container"]"#),
        selector(r#"div[class*="list-item__2G-P"]"#),
    ]
});
static TITLE_SELECTORS: Lazy<[Selector; 2]> = Lazy::new(|| {
    [
        selector(r#"a[class*="contest-card__title"]"#),
        selector(r#"a[class*="title__1oA9"]"#),
    ]
});
static TIME_SELECTORS: Lazy<[Selector; 2]> = Lazy::new(|| {
    [
        selector(r#"div[class*="contest-card__time"]"#),
        selector(r#"div[class*="time__2qQO"]"#),
    ]
});
static DURATION_SELECTORS: Lazy<[Selector; 2]> = Lazy::new(|| {
    [
        selector(r#"div[class*="contest-card__duration"]"#),
        selector(r#"div[class*="duration__1lF-"]"#),
    ]
});

pub struct LeetCode {
    url: String,
    client: Client,
}

impl LeetCode {
    pub fn new(config: &AppConfig) -> Result<Self, SourceError> {
        Ok(Self {
            url: config.leetcode_url.clone(),
            client: base::build_client(config)?,
        })
    }
}

#[async_trait]
impl ContestSource for LeetCode {
    fn platform(&self) -> Platform {
        Platform::LeetCode
    }

    fn source_url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<Contest>, SourceError> {
        tracing::info!("Scraping LeetCode contest cards from {}", self.url);
        let headers: HeaderMap = base::header_map(&BROWSER_HEADERS);
        let html = base::fetch_text(&self.client, &self.url, headers).await?;
        Ok(parse_document(&html, &self.url, Utc::now()))
    }
}

pub(crate) fn parse_document(html: &str, page_url: &str, now: DateTime<Utc>) -> Vec<Contest> {
    let document = Html::parse_document(html);

    let cards: Vec<ElementRef<'_>> = CARD_SELECTORS
        .iter()
        .map(|selector| document.select(selector).collect::<Vec<_>>())
        .find(|cards| !cards.is_empty())
        .unwrap_or_default();

    if cards.is_empty() {
        tracing::warn!("no LeetCode contest cards found at {page_url}");
    }

    let mut contests = Vec::new();
    for (i, card) in cards.into_iter().enumerate() {
        match parse_card(&card, page_url) {
            Ok(contest) if base::is_upcoming(contest.start_time, now) => contests.push(contest),
            Ok(_) => {}
            Err(EntryError::Missing(what)) => {
                tracing::debug!("LeetCode card {i} has no {what}, skipping");
            }
            Err(err) => tracing::warn!("could not parse LeetCode card {i}: {err}"),
        }
    }

    contests
}

fn parse_card(card: &ElementRef<'_>, page_url: &str) -> Result<Contest, EntryError> {
    let title = base::first_match(card, &*TITLE_SELECTORS).ok_or(EntryError::Missing("title"))?;
    let time_text =
        base::first_text(card, &*TIME_SELECTORS).ok_or(EntryError::Missing("start time"))?;
    let duration_text = base::first_match(card, &*DURATION_SELECTORS)
        .map(base::inner_text)
        .ok_or(EntryError::Missing("duration"))?;

    let name = base::inner_text(title);
    if name.is_empty() {
        return Err(EntryError::Missing("name"));
    }
    let url = title
        .value()
        .attr("href")
        .and_then(|href| base::absolute_url(page_url, href))
        .ok_or(EntryError::Missing("link"))?;

    Ok(Contest {
        name,
        platform: Platform::LeetCode,
        start_time: parse_start(&time_text)?,
        duration_seconds: base::parse_duration(&duration_text),
        url,
    })
}

/// Parses `"Jan 5, 2025 6:30 PM PST"`. The zone abbreviation is dropped and the
/// Pacific zone rules decide the offset.
pub(crate) fn parse_start(text: &str) -> Result<DateTime<Utc>, EntryError> {
    let mut stripped = text.to_string();
    for abbreviation in ZONE_ABBREVIATIONS {
        stripped = stripped.replace(abbreviation, "");
    }
    let stripped = base::clean_text(&stripped);

    let naive = NaiveDateTime::parse_from_str(&stripped, TIME_FORMAT)
        .map_err(|_| EntryError::Time(text.to_string()))?;
    base::localize(naive, TIMEZONE)
}
