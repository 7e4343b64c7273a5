//! Listing page fetcher
//!
//! This module handles the HTTP side of a run:
//! - Building the HTTP client with the configured user agent and timeout
//! - GET requests for listing pages
//! - Splitting a page into per-listing markup fragments
//! - Reading the total page count from the pagination block
//! - Classifying failures as timeout or other fetch errors

use crate::config::{ScraperConfig, SelectorConfig};
use crate::{ConfigError, ConfigResult, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;

/// One loaded listing page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedPage {
    /// Outer HTML of every listing on the page, in page order
    pub item_fragments: Vec<String>,

    /// Total page count from the pagination block, if the page had one
    pub total_pages: Option<u32>,
}

/// Capability to load one listing page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches `url` and splits it into listing fragments
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

/// Compiled selectors for the page-level structure
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    container: Selector,
    item: Selector,
    pagination: Selector,
    pages: Selector,
}

impl ListingSelectors {
    pub fn from_config(config: &SelectorConfig) -> ConfigResult<Self> {
        Ok(Self {
            container: compile("job-container", &config.job_container)?,
            item: compile("job-item", &config.job_item)?,
            pagination: compile("pagination", &config.pagination)?,
            pages: compile("pagination-pages", &config.pagination_pages)?,
        })
    }
}

fn compile(name: &str, css: &str) -> ConfigResult<Selector> {
    Selector::parse(css)
        .map_err(|e| ConfigError::InvalidSelector(format!("{} '{}': {:?}", name, css, e)))
}

/// Builds the HTTP client used for listing pages
///
/// # Example
///
/// ```no_run
/// use workana_watch::config::ScraperConfig;
/// use workana_watch::scrape::build_http_client;
///
/// # fn example(config: &ScraperConfig) {
/// let client = build_http_client(config).unwrap();
/// # }
/// ```
pub fn build_http_client(config: &ScraperConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.page_load_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches listing pages over plain HTTP
pub struct HttpPageFetcher {
    client: Client,
    selectors: ListingSelectors,
}

impl HttpPageFetcher {
    /// Creates a fetcher from a prepared client
    pub fn new(client: Client, selectors: ListingSelectors) -> Self {
        Self { client, selectors }
    }

    /// Creates a fetcher from configuration
    pub fn from_config(
        scraper: &ScraperConfig,
        selectors: &SelectorConfig,
    ) -> Result<Self, crate::WatchError> {
        let client = build_http_client(scraper)?;
        let selectors = ListingSelectors::from_config(selectors)?;
        Ok(Self::new(client, selectors))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify(url, e))?;

        split_listing(&body, &self.selectors, url)
    }
}

/// Maps a reqwest failure onto the fetch error kinds
fn classify(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

/// Splits a listing page into item fragments and reads its page count
///
/// A page without the job container counts as not loaded. A page whose
/// container holds no listings is a valid, empty page.
pub fn split_listing(
    html: &str,
    selectors: &ListingSelectors,
    url: &str,
) -> Result<FetchedPage, FetchError> {
    let document = Html::parse_document(html);

    if document.select(&selectors.container).next().is_none() {
        return Err(FetchError::ContainerMissing {
            url: url.to_string(),
        });
    }

    let item_fragments = document
        .select(&selectors.item)
        .map(|element| element.html())
        .collect();

    Ok(FetchedPage {
        item_fragments,
        total_pages: extract_total_pages(&document, selectors),
    })
}

/// Highest page number shown in the pagination block
fn extract_total_pages(document: &Html, selectors: &ListingSelectors) -> Option<u32> {
    let pagination = document.select(&selectors.pagination).next()?;

    pagination
        .select(&selectors.pages)
        .filter_map(|link| link.text().collect::<String>().trim().parse::<u32>().ok())
        .max()
}
