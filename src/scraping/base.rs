use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client, Url,
};
use scraper::{ElementRef, Selector};

use crate::config::AppConfig;
use crate::error::{EntryError, SourceError};

/// Contests that started less than this long ago still count as upcoming.
pub const UPCOMING_TOLERANCE_MINUTES: i64 = 5;

static DAYS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*d").expect("valid days regex"));
static HOURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*h").expect("valid hours regex"));
static MINUTES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*m").expect("valid minutes regex"));

pub fn clean_text(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn inner_text(element: ElementRef<'_>) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Tries each selector in order and returns the first element any of them finds.
pub fn first_match<'a>(element: &ElementRef<'a>, strategies: &[Selector]) -> Option<ElementRef<'a>> {
    strategies
        .iter()
        .find_map(|selector| element.select(selector).next())
}

pub fn first_text(element: &ElementRef<'_>, strategies: &[Selector]) -> Option<String> {
    first_match(element, strategies)
        .map(inner_text)
        .filter(|text| !text.is_empty())
}

pub fn absolute_url(base: &str, href: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base_url = Url::parse(base).ok()?;
    base_url.join(href).ok().map(|u| u.to_string())
}

pub fn build_client(config: &AppConfig) -> Result<Client, SourceError> {
    let client = Client::builder()
        .gzip(true)
        .brotli(true)
        .deflate(true)
        .timeout(config.request_timeout())
        .build()?;
    Ok(client)
}

pub async fn fetch_text(client: &Client, url: &str, headers: HeaderMap) -> Result<String, SourceError> {
    tracing::debug!("GET {url}");
    let response = client.get(url).headers(headers).send().await?;
    let response = response.error_for_status()?;
    Ok(response.text().await?)
}

/// Resolves a wall-clock time in `tz` to UTC. The earlier instant wins when the
/// local time is repeated by a DST change.
pub fn localize(naive: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, EntryError> {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(EntryError::NonexistentLocalTime(
            naive.to_string(),
            tz.name(),
        )),
    }
}

pub fn is_upcoming(start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    start > now - Duration::minutes(UPCOMING_TOLERANCE_MINUTES)
}

/// Sums the `<n>d`, `<n>h` and `<n>m` components of a free-text duration.
/// Text that overflows a `u64` of seconds counts as no duration.
pub fn parse_duration(text: &str) -> u64 {
    let component = |re: &Regex| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<u64>().ok())
            .unwrap_or(0)
    };
    let units: [(&Regex, u64); 3] = [(&*DAYS_RE, 86_400), (&*HOURS_RE, 3_600), (&*MINUTES_RE, 60)];
    let total = units
        .into_iter()
        .try_fold(0u64, |total, (re, seconds)| {
            component(re).checked_mul(seconds)?.checked_add(total)
        });

    total.unwrap_or_else(|| {
        tracing::warn!("duration {text:?} is out of range, treating it as unknown");
        0
    })
}

pub fn header_map(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        headers.insert(*name, HeaderValue::from_static(*value));
    }
    headers
}
