use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use tracing::{debug, info};

use crate::error::{ScrapeError, ScrapeResult};

pub const DEFAULT_BASE_URL: &str =
    "https://www.archiviomillionday.it/archivio-million-day.php?anno=";

const USER_AGENT: &str = concat!("millionday-scraper/", env!("CARGO_PKG_VERSION"));

/// One yearly archive page as returned by the server.
#[derive(Debug, Clone)]
pub struct YearPage {
    pub year: i32,
    pub html: String,
}

pub struct Fetcher {
    client: reqwest::Client,
    base_url: String,
}

impl Fetcher {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ScrapeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ScrapeError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn year_url(&self, year: i32) -> String {
        format!("{}{}", self.base_url, year)
    }

    pub async fn fetch_year(&self, year: i32) -> ScrapeResult<YearPage> {
        let url = self.year_url(year);
        debug!(%url, "requesting archive page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| ScrapeError::Fetch { year, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus { year, status });
        }

        let html = response
            .text()
            .await
            .map_err(|source| ScrapeError::Fetch { year, source })?;

        info!(year, bytes = html.len(), "fetched archive page");
        Ok(YearPage { year, html })
    }

    /// Fetches the given years with at most `concurrency` requests in flight.
    ///
    /// Pages come out in the order of `years` whatever order the responses arrive in.
    pub fn fetch_years<'a>(
        &'a self,
        years: &'a [i32],
        concurrency: usize,
    ) -> impl Stream<Item = ScrapeResult<YearPage>> + 'a {
        stream::iter(years.iter().copied())
            .map(move |year| self.fetch_year(year))
            .buffered(concurrency.max(1))
    }
}
