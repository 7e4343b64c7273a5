//! Pagination walker
//!
//! Walks listing pages 1..N strictly in order:
//!
//! 1. Fetch page 1; a failed fetch aborts with nothing collected
//! 2. Read the total page count once, from page 1, capped by `max_pages`
//! 3. Parse every listing on the page, dropping records without an id
//! 4. On the first already-known record, with early stop enabled, stop
//!    without looking at the rest of the page
//! 5. Otherwise wait the inter-page delay and fetch the next page, until
//!    the last page or a failed fetch
//!
//! Early stop assumes the listing is ordered newest-first: one known job
//! implies every later job is known too.

use crate::job::{JobRecord, KnownIdSet, ScrapeResult, StopReason};
use crate::scrape::{FetchedPage, PageDelay, PageFetcher, RecordParser};
use url::Url;

/// Result of scanning one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageScan {
    /// Every listing was processed
    Completed { added: usize },
    /// A known job was hit; the rest of the page was skipped
    HitKnown { added: usize },
}

/// Drives fetching and parsing across listing pages
pub struct PaginationWalker<'a, F: PageFetcher + ?Sized> {
    fetcher: &'a F,
    parser: &'a RecordParser,
    delay: &'a PageDelay,
    base_url: &'a Url,
}

impl<'a, F: PageFetcher + ?Sized> PaginationWalker<'a, F> {
    pub fn new(
        fetcher: &'a F,
        parser: &'a RecordParser,
        delay: &'a PageDelay,
        base_url: &'a Url,
    ) -> Self {
        Self {
            fetcher,
            parser,
            delay,
            base_url,
        }
    }

    /// Walks the listing and returns every record collected
    ///
    /// Never fails: a fetch failure ends pagination and keeps what earlier
    /// pages produced.
    ///
    /// # Arguments
    ///
    /// * `page_url` - Builds the listing URL for a 1-based page number
    /// * `known` - Keys persisted by earlier runs
    /// * `max_pages` - Page cap; `None` or `Some(0)` means no cap
    /// * `stop_on_known` - Stop at the first known job
    pub async fn walk<U>(
        &self,
        page_url: U,
        known: &KnownIdSet,
        max_pages: Option<u32>,
        stop_on_known: bool,
    ) -> ScrapeResult
    where
        U: Fn(u32) -> String,
    {
        let mut jobs = Vec::new();
        let mut page = 1;

        let first_url = page_url(page);
        tracing::info!("Loading page {}: {}", page, first_url);

        let mut current = match self.fetcher.fetch(&first_url).await {
            Ok(loaded) => loaded,
            Err(error) => {
                tracing::warn!("Failed to load page {}: {}", page, error);
                return ScrapeResult::aborted(jobs, 0, page, error);
            }
        };

        let total_pages = effective_total_pages(current.total_pages, max_pages);
        tracing::info!("Total pages: {}", total_pages);

        loop {
            tracing::info!("Scraping page {}/{}", page, total_pages);

            match self.scan_page(&current, known, stop_on_known, &mut jobs) {
                PageScan::HitKnown { added } => {
                    tracing::info!(
                        "Scraped {} jobs from page {}; stopping on known job",
                        added,
                        page
                    );
                    return finished(jobs, page, StopReason::FoundKnownJob { page });
                }
                PageScan::Completed { added } => {
                    tracing::info!("Scraped {} jobs from page {}", added, page);
                }
            }

            if page >= total_pages {
                return finished(jobs, page, StopReason::LastPage);
            }

            self.delay.wait().await;
            page += 1;

            let url = page_url(page);
            tracing::debug!("Loading page {}: {}", page, url);
            current = match self.fetcher.fetch(&url).await {
                Ok(loaded) => loaded,
                Err(error) => {
                    tracing::warn!("Failed to load page {}, stopping: {}", page, error);
                    return ScrapeResult::aborted(jobs, page - 1, page, error);
                }
            };
        }
    }

    /// Parses a page's listings in order, appending usable records
    fn scan_page(
        &self,
        page: &FetchedPage,
        known: &KnownIdSet,
        stop_on_known: bool,
        jobs: &mut Vec<JobRecord>,
    ) -> PageScan {
        if page.item_fragments.is_empty() {
            tracing::info!("No job elements found on page");
            return PageScan::Completed { added: 0 };
        }

        tracing::debug!("Found {} jobs on page", page.item_fragments.len());

        let mut added = 0;
        for (index, fragment) in page.item_fragments.iter().enumerate() {
            let job = self.parser.parse(fragment, self.base_url);

            if !job.is_usable() {
                tracing::debug!("Skipping job element {}: no id", index + 1);
                continue;
            }

            if stop_on_known && known.contains(&job) {
                tracing::info!("Found known job {}, stopping scrape", job);
                return PageScan::HitKnown { added };
            }

            jobs.push(job);
            added += 1;
        }

        PageScan::Completed { added }
    }
}

/// Page count to walk: reported count (unknown = 1) capped by `max_pages`
fn effective_total_pages(reported: Option<u32>, max_pages: Option<u32>) -> u32 {
    let total = reported.unwrap_or(1).max(1);
    match max_pages.filter(|&cap| cap > 0) {
        Some(cap) => total.min(cap),
        None => total,
    }
}

fn finished(jobs: Vec<JobRecord>, pages_scraped: u32, stop_reason: StopReason) -> ScrapeResult {
    ScrapeResult {
        found_known_job: matches!(stop_reason, StopReason::FoundKnownJob { .. }),
        scraped_count: jobs.len(),
        jobs,
        pages_scraped,
        stop_reason,
    }
}
