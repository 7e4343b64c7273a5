//! Storage module for persisting jobs and runs
//!
//! This module handles all database operations for the watcher, including:
//! - SQLite database initialization and schema management
//! - The set of known jobs, keyed by `id|client_name`
//! - Run tracking with per-run counters
//! - Retention cleanup beyond the configured job limit

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{JobStore, StorageError, StorageResult};

use crate::job::JobRecord;
use crate::WatchError;

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(WatchError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> Result<SqliteStorage, WatchError> {
    SqliteStorage::new(path)
}

/// Represents a scrape run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub pages_scraped: u32,
    pub jobs_scraped: u32,
    pub new_jobs: u32,
    pub found_known_job: bool,
    pub error_message: Option<String>,
}

/// Counters recorded when a run completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub pages_scraped: u32,
    pub jobs_scraped: u32,
    pub new_jobs: u32,
    pub found_known_job: bool,
}

/// A persisted job with its bookkeeping columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredJob {
    pub job: JobRecord,
    pub first_seen_at: String,
    pub run_id: i64,
}

/// Status of a scrape run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}
