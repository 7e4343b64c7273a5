//! Storage traits and error types
//!
//! This module defines the trait interface for job stores and the
//! associated error types.

use crate::job::{JobRecord, KnownIdSet};
use crate::storage::{RunRecord, RunSummary, StoredJob};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for job store implementations
///
/// A store owns the set of persisted jobs and the history of runs. The
/// scrape itself never touches it: the watch cycle reads known keys before
/// a run and writes new jobs after it.
pub trait JobStore {
    // ===== Run Management =====

    /// Creates a new run in the `running` state
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as completed and records its counters
    fn complete_run(&mut self, run_id: i64, summary: &RunSummary) -> StorageResult<()>;

    /// Marks a run as failed with an error message
    fn fail_run(&mut self, run_id: i64, message: &str) -> StorageResult<()>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Counts all runs ever recorded
    fn count_runs(&self) -> StorageResult<u64>;

    // ===== Jobs =====

    /// Loads the composite key of every persisted job
    fn load_known_keys(&self) -> StorageResult<KnownIdSet>;

    /// Persists jobs discovered by `run_id`
    ///
    /// Jobs whose key is already stored are left untouched.
    ///
    /// # Returns
    ///
    /// The number of jobs actually inserted
    fn insert_jobs(&mut self, jobs: &[JobRecord], run_id: i64) -> StorageResult<usize>;

    /// Counts all persisted jobs
    fn count_jobs(&self) -> StorageResult<u64>;

    /// Counts jobs first seen within the last `hours` hours
    fn count_jobs_since(&self, hours: i64) -> StorageResult<u64>;

    /// Most recently seen jobs, newest first
    fn recent_jobs(&self, limit: usize) -> StorageResult<Vec<StoredJob>>;

    /// Deletes all but the newest `max_jobs` jobs
    ///
    /// # Returns
    ///
    /// The number of jobs removed
    fn cleanup_old_jobs(&mut self, max_jobs: u32) -> StorageResult<usize>;
}
