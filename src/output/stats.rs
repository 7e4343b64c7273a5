//! Statistics from the job database
//!
//! This module extracts run and job counters from the storage layer and
//! renders them for the terminal.

use crate::storage::{JobStore, RunRecord, StoredJob};
use crate::WatchError;
use std::fmt;

/// Window used for the "new jobs" counter
pub const NEW_JOBS_WINDOW_HOURS: i64 = 24;

/// Job database statistics
#[derive(Debug, Clone)]
pub struct JobStatistics {
    /// Total number of persisted jobs
    pub total_jobs: u64,

    /// Jobs first seen in the last 24 hours
    pub new_jobs_24h: u64,

    /// Number of runs ever recorded
    pub total_runs: u64,

    /// Most recent run, if any
    pub last_run: Option<RunRecord>,

    /// Newest jobs, newest first
    pub recent_jobs: Vec<StoredJob>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The job store to query
/// * `recent_limit` - How many of the newest jobs to include
///
/// # Returns
///
/// * `Ok(JobStatistics)` - Successfully loaded statistics
/// * `Err(WatchError)` - Failed to query statistics
pub fn load_statistics(
    storage: &dyn JobStore,
    recent_limit: usize,
) -> Result<JobStatistics, WatchError> {
    Ok(JobStatistics {
        total_jobs: storage.count_jobs()?,
        new_jobs_24h: storage.count_jobs_since(NEW_JOBS_WINDOW_HOURS)?,
        total_runs: storage.count_runs()?,
        last_run: storage.get_latest_run()?,
        recent_jobs: storage.recent_jobs(recent_limit)?,
    })
}

impl fmt::Display for JobStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Job Statistics ===\n")?;
        writeln!(f, "Overview:")?;
        writeln!(f, "  Total jobs: {}", self.total_jobs)?;
        writeln!(f, "  New jobs (24h): {}", self.new_jobs_24h)?;
        writeln!(f, "  Total runs: {}", self.total_runs)?;
        writeln!(f)?;

        if let Some(run) = &self.last_run {
            writeln!(f, "Last Run:")?;
            writeln!(f, "  #{} {} ({})", run.id, run.started_at, run.status.to_db_string())?;
            writeln!(
                f,
                "  Pages: {}, scraped: {}, new: {}, stopped on known job: {}",
                run.pages_scraped,
                run.jobs_scraped,
                run.new_jobs,
                if run.found_known_job { "yes" } else { "no" }
            )?;
            if let Some(error) = &run.error_message {
                writeln!(f, "  Error: {}", error)?;
            }
            writeln!(f)?;
        }

        if !self.recent_jobs.is_empty() {
            writeln!(f, "Recent Jobs:")?;
            for stored in &self.recent_jobs {
                let job = &stored.job;
                let title = if job.title.is_empty() { "(untitled)" } else { &job.title };
                writeln!(f, "  - {} [{}]", title, job)?;
                if !job.url.is_empty() {
                    writeln!(f, "    {}", job.url)?;
                }
            }
        }

        Ok(())
    }
}

/// Prints statistics to stdout
pub fn print_statistics(stats: &JobStatistics) {
    print!("{}", stats);
}
