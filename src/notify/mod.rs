//! Chat notifications for newly found jobs
//!
//! # Components
//!
//! - `Notifier`: async seam the watch cycle reports through
//! - `SlackNotifier`: posts Block Kit messages to a Slack incoming webhook
//! - `format`: pure payload builders, kept separate so they can be tested
//!   without a network

pub mod format;
mod slack;

pub use slack::SlackNotifier;

use crate::job::JobRecord;
use crate::output::JobStatistics;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Notification failures
///
/// None of these fail a watch cycle; the cycle logs them and moves on.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Webhook rejected message with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("{failed} of {total} messages failed")]
    Partial { failed: usize, total: usize },
}

/// Destination for new-job reports
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Reports a batch of new jobs; an empty batch sends nothing
    ///
    /// # Arguments
    ///
    /// * `jobs` - New jobs in listing order
    /// * `total_scraped` - Records collected before deduplication
    async fn notify_new_jobs(
        &self,
        jobs: &[JobRecord],
        total_scraped: usize,
    ) -> Result<(), NotifyError>;

    /// Reports database statistics after a run
    async fn notify_summary(
        &self,
        stats: &JobStatistics,
        duration: Duration,
    ) -> Result<(), NotifyError>;
}
