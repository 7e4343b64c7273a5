//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.

use crate::job::{JobRecord, KnownIdSet};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{JobStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, RunSummary, StoredJob};
use crate::WatchError;
use chrono::{Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, pages_scraped,
     jobs_scraped, new_jobs, found_known_job, error_message";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(WatchError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, WatchError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, WatchError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

/// Current time as a fixed-width RFC 3339 string, so text order is time order
fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Failed),
        pages_scraped: row.get(5)?,
        jobs_scraped: row.get(6)?,
        new_jobs: row.get(7)?,
        found_known_job: row.get(8)?,
        error_message: row.get(9)?,
    })
}

impl JobStore for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![timestamp_now(), config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64, summary: &RunSummary) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_scraped = ?3,
             jobs_scraped = ?4, new_jobs = ?5, found_known_job = ?6 WHERE id = ?7",
            params![
                RunStatus::Completed.to_db_string(),
                timestamp_now(),
                summary.pages_scraped,
                summary.jobs_scraped,
                summary.new_jobs,
                summary.found_known_job,
                run_id
            ],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, message: &str) -> StorageResult<()> {
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, error_message = ?3 WHERE id = ?4",
            params![RunStatus::Failed.to_db_string(), timestamp_now(), message, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }

    fn count_runs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM runs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // ===== Jobs =====

    fn load_known_keys(&self) -> StorageResult<KnownIdSet> {
        let mut stmt = self.conn.prepare("SELECT job_key FROM jobs")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(KnownIdSet::from_keys(keys))
    }

    fn insert_jobs(&mut self, jobs: &[JobRecord], run_id: i64) -> StorageResult<usize> {
        let now = timestamp_now();
        let tx = self.conn.transaction()?;
        let mut inserted = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO jobs (job_key, job_id, client_name, title, url, budget,
                 client_country, client_payment_verified, first_seen_at, run_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )?;

            // Listings arrive newest-first; insert oldest first so rowid follows recency
            for job in jobs.iter().rev().filter(|j| j.is_usable()) {
                inserted += stmt.execute(params![
                    job.key(),
                    job.id,
                    job.client_name,
                    job.title,
                    job.url,
                    job.budget,
                    job.client_country,
                    job.client_payment_verified,
                    now,
                    run_id
                ])?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    fn count_jobs(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM jobs", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_jobs_since(&self, hours: i64) -> StorageResult<u64> {
        let cutoff = (Utc::now() - Duration::hours(hours)).to_rfc3339_opts(SecondsFormat::Micros, true);
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM jobs WHERE first_seen_at >= ?1",
            params![cutoff],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn recent_jobs(&self, limit: usize) -> StorageResult<Vec<StoredJob>> {
        let mut stmt = self.conn.prepare(
            "SELECT job_id, client_name, title, url, budget, client_country,
             client_payment_verified, first_seen_at, run_id
             FROM jobs ORDER BY first_seen_at DESC, rowid DESC LIMIT ?1",
        )?;

        let jobs = stmt
            .query_map(params![limit as i64], |row| {
                Ok(StoredJob {
                    job: JobRecord {
                        id: row.get(0)?,
                        client_name: row.get(1)?,
                        title: row.get(2)?,
                        url: row.get(3)?,
                        budget: row.get(4)?,
                        client_country: row.get(5)?,
                        client_payment_verified: row.get(6)?,
                    },
                    first_seen_at: row.get(7)?,
                    run_id: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(jobs)
    }

    fn cleanup_old_jobs(&mut self, max_jobs: u32) -> StorageResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM jobs WHERE job_key NOT IN (
                SELECT job_key FROM jobs ORDER BY first_seen_at DESC, rowid DESC LIMIT ?1
             )",
            params![max_jobs],
        )?;

        if removed > 0 {
            tracing::info!("Removed {} old jobs (keeping {})", removed, max_jobs);
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, client: &str) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            client_name: client.to_string(),
            title: format!("Job {}", id),
            url: format!("https://www.workana.com/job/{}", id),
            budget: "USD 100 - 250".to_string(),
            client_country: "Argentina".to_string(),
            client_payment_verified: true,
        }
    }

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStorage::new_in_memory().is_ok());
    }

    #[test]
    fn test_create_and_complete_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("test_hash").unwrap();
        assert!(run_id > 0);

        let summary = RunSummary {
            pages_scraped: 2,
            jobs_scraped: 7,
            new_jobs: 5,
            found_known_job: true,
        };
        storage.complete_run(run_id, &summary).unwrap();

        let run = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.config_hash, "test_hash");
        assert_eq!(run.new_jobs, 5);
        assert!(run.found_known_job);
        assert!(run.finished_at.is_some());
    }

    #[test]
    fn test_fail_run_records_message() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("h").unwrap();
        storage.fail_run(run_id, "disk full").unwrap();

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert_eq!(run.error_message.as_deref(), Some("disk full"));
    }

    #[test]
    fn test_unknown_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.get_run(42),
            Err(StorageError::RunNotFound(42))
        ));
        assert!(storage.fail_run(42, "x").is_err());
        assert!(storage.get_latest_run().unwrap().is_none());
    }

    #[test]
    fn test_insert_ignores_existing_keys() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("h").unwrap();

        let first = storage
            .insert_jobs(&[job("J1", "Acme"), job("J2", "Beta")], run_id)
            .unwrap();
        let second = storage
            .insert_jobs(&[job("J1", "Acme"), job("J1", "Other")], run_id)
            .unwrap();

        assert_eq!(first, 2);
        assert_eq!(second, 1);
        assert_eq!(storage.count_jobs().unwrap(), 3);
    }

    #[test]
    fn test_load_known_keys() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("h").unwrap();
        storage
            .insert_jobs(&[job("J1", "Acme"), job("J2", "")], run_id)
            .unwrap();

        let known = storage.load_known_keys().unwrap();
        assert_eq!(known.len(), 2);
        assert!(known.contains_key("J1|Acme"));
        assert!(known.contains_key("J2|"));
    }

    #[test]
    fn test_recent_jobs_follow_listing_order() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("h").unwrap();
        storage
            .insert_jobs(&[job("J3", "c"), job("J2", "b"), job("J1", "a")], run_id)
            .unwrap();

        let recent = storage.recent_jobs(2).unwrap();
        let ids: Vec<_> = recent.iter().map(|s| s.job.id.as_str()).collect();
        assert_eq!(ids, vec!["J3", "J2"]);
        assert_eq!(recent[0].job, job("J3", "c"));
        assert_eq!(recent[0].run_id, run_id);
    }

    #[test]
    fn test_cleanup_keeps_newest() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("h").unwrap();
        storage
            .insert_jobs(&[job("J2", "b"), job("J1", "a")], run_id)
            .unwrap();
        storage
            .insert_jobs(&[job("J4", "d"), job("J3", "c")], run_id)
            .unwrap();

        let removed = storage.cleanup_old_jobs(3).unwrap();

        assert_eq!(removed, 1);
        let known = storage.load_known_keys().unwrap();
        assert!(!known.contains_key("J1|a"));
        assert!(known.contains_key("J4|d"));
        assert_eq!(storage.cleanup_old_jobs(3).unwrap(), 0);
    }

    #[test]
    fn test_counts() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("h").unwrap();
        storage.create_run("h").unwrap();
        storage.insert_jobs(&[job("J1", "a")], run_id).unwrap();

        assert_eq!(storage.count_runs().unwrap(), 2);
        assert_eq!(storage.count_jobs_since(24).unwrap(), 1);
        assert_eq!(storage.count_jobs().unwrap(), 1);
    }

    #[test]
    fn test_file_database_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jobs.db");

        {
            let mut storage = SqliteStorage::new(&path).unwrap();
            let run_id = storage.create_run("h").unwrap();
            storage.insert_jobs(&[job("J1", "a")], run_id).unwrap();
        }

        let storage = SqliteStorage::new(&path).unwrap();
        assert!(storage.load_known_keys().unwrap().contains_key("J1|a"));
    }
}
