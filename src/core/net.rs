// src/core/net.rs
// Page fetching. The core only sees `PageFetcher`; `HttpFetcher` is the
// stock implementation over a pooled ureq agent.

use std::thread;

use tracing::{debug, warn};

use crate::calendar::ResolvedDate;
use crate::config::FetchOptions;
use crate::config::consts::CHARTS_PREFIX;
use crate::error::{ChartError, Result};

/// Returns the raw markup of one chart edition.
///
/// Implementations fail with [`ChartError::NotFound`] when the site does not
/// know the chart, and [`ChartError::Network`] for transport problems.
/// Any closure `Fn(&str, ResolvedDate) -> Result<String>` is a fetcher, which
/// keeps tests and fixtures free of network access.
pub trait PageFetcher {
    fn fetch(&self, chart: &str, date: ResolvedDate) -> Result<String>;
}

impl<F> PageFetcher for F
where
    F: Fn(&str, ResolvedDate) -> Result<String>,
{
    fn fetch(&self, chart: &str, date: ResolvedDate) -> Result<String> {
        self(chart, date)
    }
}

/// `https://www.billboard.com/charts/hot-100` or `.../charts/hot-100/2015-11-28`.
pub fn chart_url(base: &str, chart: &str, date: ResolvedDate) -> String {
    let base = base.trim_end_matches('/');
    match date {
        ResolvedDate::Latest => format!("{base}{CHARTS_PREFIX}{chart}"),
        ResolvedDate::Edition(_) => format!("{base}{CHARTS_PREFIX}{chart}/{date}"),
    }
}

/// Chart identifiers are URL slugs: lowercase ASCII, digits and dashes.
fn is_slug(chart: &str) -> bool {
    !chart.is_empty()
        && chart.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[derive(Clone)]
pub struct HttpFetcher {
    agent: ureq::Agent,
    options: FetchOptions,
}

impl HttpFetcher {
    pub fn new(options: FetchOptions) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(options.timeout()))
            .build();
        let agent: ureq::Agent = config.into();
        Self { agent, options }
    }

    fn get_once(&self, chart: &str, url: &str) -> Result<String> {
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", &self.options.user_agent)
            .call()
            .map_err(|e| classify(chart, e))?;
        response
            .body_mut()
            .read_to_string()
            .map_err(|e| classify(chart, e))
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new(FetchOptions::default())
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, chart: &str, date: ResolvedDate) -> Result<String> {
        if !is_slug(chart) {
            return Err(ChartError::NotFound(s!(chart)));
        }
        let url = chart_url(&self.options.base_url, chart, date);
        debug!("GET {url}");

        let attempts = self.options.max_retries + 1;
        let mut attempt = 0u32;
        loop {
            match self.get_once(chart, &url) {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt + 1 < attempts => {
                    let delay = self.options.retry_delay(attempt);
                    warn!("{url}: {e}; retrying in {delay:?} ({}/{})", attempt + 1, attempts - 1);
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// 404 means the chart slug is unknown. Everything else is a transport
/// problem for the caller (or the retry loop) to judge.
fn classify(chart: &str, e: ureq::Error) -> ChartError {
    match e {
        ureq::Error::StatusCode(404) => ChartError::NotFound(s!(chart)),
        ureq::Error::StatusCode(code) => ChartError::Network(format!("HTTP {code} for {chart}")),
        ureq::Error::Timeout(t) => ChartError::Network(format!("timed out ({t:?})")),
        other => ChartError::Network(other.to_string()),
    }
}
