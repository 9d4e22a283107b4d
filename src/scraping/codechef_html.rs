use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use super::base;
use super::ContestSource;
use crate::config::AppConfig;
use crate::error::{EntryError, SourceError};
use crate::models::{Contest, Platform};

const TIMEZONE: Tz = chrono_tz::Asia::Kolkata;
const TIME_FORMAT: &str = "%d %b %Y %H:%M:%S";
const MIN_COLUMNS: usize = 5;
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

static CONTAINER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.contest-table").expect("codechef container selector"));
static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table.table").expect("codechef table selector"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("codechef row selector"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("codechef cell selector"));
static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("codechef link selector"));

pub struct CodeChef {
    url: String,
    client: Client,
}

impl CodeChef {
    pub fn new(config: &AppConfig) -> Result<Self, SourceError> {
        Ok(Self {
            url: config.codechef_url.clone(),
            client: base::build_client(config)?,
        })
    }
}

#[async_trait]
impl ContestSource for CodeChef {
    fn platform(&self) -> Platform {
        Platform::CodeChef
    }

    fn source_url(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<Vec<Contest>, SourceError> {
        tracing::info!("Scraping CodeChef contest table from {}", self.url);
        let headers = base::header_map(&[("user-agent", USER_AGENT)]);
        let html = base::fetch_text(&self.client, &self.url, headers).await?;
        parse_document(&html, &self.url, Utc::now())
    }
}

pub(crate) fn parse_document(
    html: &str,
    page_url: &str,
    now: DateTime<Utc>,
) -> Result<Vec<Contest>, SourceError> {
    let document = Html::parse_document(html);

    let container = document
        .select(&CONTAINER_SELECTOR)
        .next()
        .ok_or_else(|| SourceError::Structure("no div.contest-table on the page".to_string()))?;
    let table = container
        .select(&TABLE_SELECTOR)
        .next()
        .ok_or_else(|| SourceError::Structure("no table.table in div.contest-table".to_string()))?;

    let mut contests = Vec::new();
    // The first row is the header.
    for (i, row) in table.select(&ROW_SELECTOR).enumerate().skip(1) {
        let cells: Vec<ElementRef<'_>> = row.select(&CELL_SELECTOR).collect();
        if cells.len() < MIN_COLUMNS {
            continue;
        }

        match parse_row(&cells, page_url) {
            Ok(contest) if base::is_upcoming(contest.start_time, now) => contests.push(contest),
            Ok(_) => {}
            Err(err) => tracing::warn!("could not parse CodeChef row {i}: {err}"),
        }
    }

    Ok(contests)
}

fn parse_row(cells: &[ElementRef<'_>], page_url: &str) -> Result<Contest, EntryError> {
    let link = cells[0]
        .select(&LINK_SELECTOR)
        .next()
        .ok_or(EntryError::Missing("contest link"))?;
    let name = base::inner_text(link);
    if name.is_empty() {
        return Err(EntryError::Missing("name"));
    }

    let code = base::inner_text(cells[1]);
    if code.is_empty() {
        return Err(EntryError::Missing("contest code"));
    }
    let url = base::absolute_url(page_url, &code).ok_or(EntryError::Missing("contest url"))?;

    let start_time = parse_local_time(&base::inner_text(cells[2]))?;
    let end_time = parse_local_time(&base::inner_text(cells[3]))?;
    let seconds = (end_time - start_time).num_seconds();
    let duration_seconds =
        u64::try_from(seconds).map_err(|_| EntryError::NegativeDuration(seconds))?;

    Ok(Contest {
        name,
        platform: Platform::CodeChef,
        start_time,
        duration_seconds,
        url,
    })
}

/// Parses `"15 Aug 2025 22:00:00"` as India Standard Time.
pub(crate) fn parse_local_time(text: &str) -> Result<DateTime<Utc>, EntryError> {
    let naive = NaiveDateTime::parse_from_str(text.trim(), TIME_FORMAT)
        .map_err(|_| EntryError::Time(text.to_string()))?;
    base::localize(naive, TIMEZONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const PAGE_URL: &str = "https://www.codechef.com/contests";

    const SAMPLE_HTML: &str = r#"
    <html><body>
    <div class="contest-table">
        <table class="table table-bordered">
            <thead>
                <tr><th>Name</th><th>Code</th><th>Start</th><th>End</th><th>Participants</th></tr>
            </thead>
            <tbody>
                <tr>
                    <td><a href="/START201">Starters 201 (Div 2)</a></td>
                    <td>START201</td>
                    <td>15 Aug 2025 22:00:00</td>
                    <td>16 Aug 2025 00:00:00</td>
                    <td>0</td>
                </tr>
                <tr>
                    <td><a href="/COOK99">  Cook-Off 99 </a></td>
                    <td> COOK99 </td>
                    <td>13 Aug 2025 20:00:00</td>
                    <td>13 Aug 2025 22:30:00</td>
                    <td>12</td>
                </tr>
                <tr>
                    <td><a href="/BROKEN">Broken Clock</a></td>
                    <td>BROKEN</td>
                    <td>20 Aug 2025 22:00:00</td>
                    <td>20 Aug 2025 21:00:00</td>
                    <td>0</td>
                </tr>
                <tr>
                    <td><a href="/TBA">Long Challenge</a></td>
                    <td>LTIME</td>
                    <td>Coming soon</td>
                    <td>-</td>
                    <td>0</td>
                </tr>
                <tr>
                    <td>Practice</td>
                    <td>PRACTICE</td>
                    <td>01 Sep 2025 10:00:00</td>
                    <td>01 Sep 2025 12:00:00</td>
                    <td>0</td>
                </tr>
                <tr>
                    <td><a href="/SHORT">Short Row</a></td>
                    <td>SHORT</td>
                    <td>01 Sep 2025 10:00:00</td>
                </tr>
                <tr>
                    <td><a href="/PAST">Last Week</a></td>
                    <td>PAST</td>
                    <td>01 Aug 2025 20:00:00</td>
                    <td>01 Aug 2025 22:00:00</td>
                    <td>3000</td>
                </tr>
            </tbody>
        </table>
    </div>
    </body></html>
    "#;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 10, 0, 0, 0).unwrap()
    }

    #[test]
    fn parses_codechef_rows() {
        let contests = parse_document(SAMPLE_HTML, PAGE_URL, now()).expect("parse codechef html");
        assert_eq!(contests.len(), 2);

        let starters = &contests[0];
        assert_eq!(starters.name, "Starters 201 (Div 2)");
        assert_eq!(starters.platform, Platform::CodeChef);
        assert_eq!(starters.url, "https://www.codechef.com/START201");
        assert_eq!(
            starters.start_time,
            Utc.with_ymd_and_hms(2025, 8, 15, 16, 30, 0).unwrap()
        );
        assert_eq!(starters.duration_seconds, 7_200);

        let cook_off = &contests[1];
        assert_eq!(cook_off.name, "Cook-Off 99");
        assert_eq!(cook_off.url, "https://www.codechef.com/COOK99");
        assert_eq!(cook_off.duration_seconds, 9_000);
    }

    #[test]
    fn ist_is_converted_to_utc() {
        assert_eq!(
            parse_local_time("15 Aug 2025 22:00:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 8, 15, 16, 30, 0).unwrap()
        );
        assert_eq!(
            parse_local_time("01 Jan 2026 03:00:00").unwrap(),
            Utc.with_ymd_and_hms(2025, 12, 31, 21, 30, 0).unwrap()
        );
    }

    #[test]
    fn end_before_start_is_rejected() {
        let document = Html::parse_fragment(
            r#"<table><tr>
                <td><a href="/BROKEN">Broken Clock</a></td>
                <td>BROKEN</td>
                <td>20 Aug 2025 22:00:00</td>
                <td>20 Aug 2025 21:00:00</td>
                <td>0</td>
            </tr></table>"#,
        );
        let cells: Vec<ElementRef<'_>> = document.select(&CELL_SELECTOR).collect();
        assert_eq!(
            parse_row(&cells, PAGE_URL),
            Err(EntryError::NegativeDuration(-3_600))
        );
    }

    #[test]
    fn missing_structure_is_an_error() {
        let no_container = "<html><body><table class=\"table\"></table></body></html>";
        assert!(matches!(
            parse_document(no_container, PAGE_URL, now()),
            Err(SourceError::Structure(_))
        ));

        let no_table = "<div class=\"contest-table\"><p>No contests</p></div>";
        assert!(matches!(
            parse_document(no_table, PAGE_URL, now()),
            Err(SourceError::Structure(_))
        ));
    }
}
