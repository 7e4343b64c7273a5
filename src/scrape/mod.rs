//! Listing scrape pipeline
//!
//! This module handles one pass over the job listing:
//! - Loading listing pages (`PageFetcher`, `HttpPageFetcher`)
//! - Turning listing markup into records (`RecordParser`)
//! - Walking pages in order with early stop on known jobs (`PaginationWalker`)
//! - Splitting results into new and known records (`dedup_filter`)
//! - Composing a full run (`Orchestrator`) and a full watch cycle (`run_watch`)

mod cycle;
mod dedup;
mod fetcher;
mod orchestrator;
mod pacing;
mod parser;
mod walker;

#[cfg(test)]
mod testing;

pub use cycle::{run_cycle, run_watch, CyclePlan, CycleReport, WatchOptions};
pub use dedup::{dedup_filter, Partition};
pub use fetcher::{
    build_http_client, split_listing, FetchedPage, HttpPageFetcher, ListingSelectors, PageFetcher,
};
pub use orchestrator::Orchestrator;
pub use pacing::PageDelay;
pub use parser::{FieldRule, FieldSource, FieldTransform, RecordParser};
pub use walker::PaginationWalker;
