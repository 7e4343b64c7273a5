use crate::job::JobRecord;
use crate::FetchError;

/// Why pagination stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// The last page (true or capped) was scraped
    LastPage,

    /// A known job was found on `page` while early stop was enabled
    FoundKnownJob { page: u32 },

    /// Fetching `page` failed; earlier pages are kept
    Aborted { page: u32, error: FetchError },
}

/// Outcome of one scrape run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeResult {
    /// Records in page order
    pub jobs: Vec<JobRecord>,

    /// Set when the run ended early on an already-known job
    pub found_known_job: bool,

    /// Records collected across all pages before deduplication
    pub scraped_count: usize,

    /// Number of pages fetched successfully
    pub pages_scraped: u32,

    pub stop_reason: StopReason,
}

impl ScrapeResult {
    /// A run that ended on a failed fetch of `page`
    pub fn aborted(jobs: Vec<JobRecord>, pages_scraped: u32, page: u32, error: FetchError) -> Self {
        Self {
            scraped_count: jobs.len(),
            jobs,
            found_known_job: false,
            pages_scraped,
            stop_reason: StopReason::Aborted { page, error },
        }
    }

    /// Returns true if pagination ended on a fetch failure
    pub fn is_aborted(&self) -> bool {
        matches!(self.stop_reason, StopReason::Aborted { .. })
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
