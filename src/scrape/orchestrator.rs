//! Run orchestrator
//!
//! Composes one scrape run: walk the listing, then split what was collected
//! into new and known records. A run never fails; fetch problems surface as
//! a shorter result with an `Aborted` stop reason.

use crate::config::Config;
use crate::job::{KnownIdSet, ScrapeResult};
use crate::scrape::{
    dedup_filter, HttpPageFetcher, PageDelay, PageFetcher, PaginationWalker, RecordParser,
};
use crate::url::JobsUrlBuilder;
use crate::WatchError;
use url::Url;

/// Runs the listing scrape with a fixed set of collaborators
pub struct Orchestrator<F: PageFetcher> {
    fetcher: F,
    parser: RecordParser,
    urls: JobsUrlBuilder,
    delay: PageDelay,
    base_url: Url,
}

impl<F: PageFetcher> Orchestrator<F> {
    pub fn new(
        fetcher: F,
        parser: RecordParser,
        urls: JobsUrlBuilder,
        delay: PageDelay,
        base_url: Url,
    ) -> Self {
        Self {
            fetcher,
            parser,
            urls,
            delay,
            base_url,
        }
    }

    /// Listing URL builder in use
    pub fn urls(&self) -> &JobsUrlBuilder {
        &self.urls
    }

    #[cfg(test)]
    pub(crate) fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Scrapes the listing and returns only records new to `known`
    ///
    /// `scraped_count` in the result counts every usable record the walk
    /// collected, before deduplication.
    ///
    /// # Arguments
    ///
    /// * `known` - Keys persisted by earlier runs
    /// * `max_pages` - Page cap; `None` or `Some(0)` means no cap
    /// * `stop_on_known` - Stop at the first known job
    pub async fn run(
        &self,
        known: &KnownIdSet,
        max_pages: Option<u32>,
        stop_on_known: bool,
    ) -> ScrapeResult {
        tracing::info!(
            "Starting scrape ({} known jobs, max pages: {}, stop on known: {})",
            known.len(),
            max_pages
                .filter(|&n| n > 0)
                .map_or_else(|| "unlimited".to_string(), |n| n.to_string()),
            stop_on_known
        );

        let walker = PaginationWalker::new(&self.fetcher, &self.parser, &self.delay, &self.base_url);
        let walked = walker
            .walk(|page| self.urls.page_url(page), known, max_pages, stop_on_known)
            .await;

        let partition = dedup_filter(walked.jobs, known);

        tracing::info!(
            "Scrape finished: {} scraped, {} new, {} already known",
            walked.scraped_count,
            partition.new.len(),
            partition.known.len()
        );

        ScrapeResult {
            jobs: partition.new,
            found_known_job: walked.found_known_job,
            scraped_count: walked.scraped_count,
            pages_scraped: walked.pages_scraped,
            stop_reason: walked.stop_reason,
        }
    }
}

impl Orchestrator<HttpPageFetcher> {
    /// Builds an HTTP-backed orchestrator from configuration
    pub fn from_config(config: &Config) -> Result<Self, WatchError> {
        let base_url = Url::parse(&config.scraper.base_url)?;
        Ok(Self::new(
            HttpPageFetcher::from_config(&config.scraper, &config.selectors)?,
            RecordParser::new(&config.selectors),
            JobsUrlBuilder::from_config(&config.scraper)?,
            PageDelay::from_config(&config.scraper),
            base_url,
        ))
    }
}
