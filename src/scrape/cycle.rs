//! Watch cycle
//!
//! One cycle wraps a scrape run with its collaborators:
//!
//! 1. Create a run row
//! 2. Load known keys from the store
//! 3. Scrape (never fails)
//! 4. Persist the new jobs
//! 5. Notify (failures are logged only)
//! 6. Trim the store to the retention limit
//! 7. Complete the run row, then optionally post a summary
//!
//! A storage failure fails the cycle and marks the run row as failed when
//! the store still accepts writes.

use crate::config::Config;
use crate::job::{ScrapeResult, StopReason};
use crate::notify::{Notifier, SlackNotifier};
use crate::output::load_statistics;
use crate::scrape::{Orchestrator, PageFetcher};
use crate::storage::{open_storage, JobStore, RunSummary};
use crate::WatchError;
use std::path::Path;
use std::time::{Duration, Instant};

/// Caller-supplied switches for one watch cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Scrape every page instead of stopping at the first known job
    pub backfill: bool,

    /// Overrides the configured page cap
    pub max_pages: Option<u32>,

    /// Send chat notifications when a webhook is configured
    pub notify: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            backfill: false,
            max_pages: None,
            notify: true,
        }
    }
}

/// Resolved settings for one cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CyclePlan {
    pub config_hash: String,
    pub max_pages: Option<u32>,
    pub stop_on_known: bool,
    pub max_jobs: u32,
    pub send_summary: bool,
}

impl CyclePlan {
    /// Merges configuration with per-invocation options
    pub fn new(config: &Config, config_hash: &str, options: &WatchOptions) -> Self {
        Self {
            config_hash: config_hash.to_string(),
            max_pages: options.max_pages.or(config.scraper.max_pages),
            stop_on_known: config.scraper.stop_on_known_job && !options.backfill,
            max_jobs: config.storage.max_jobs,
            send_summary: config.notify.send_summary,
        }
    }
}

/// What one cycle did
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub run_id: i64,

    /// Scrape outcome; `jobs` holds only the new records
    pub result: ScrapeResult,

    /// Jobs written to the store
    pub inserted: usize,

    /// Jobs removed by retention cleanup
    pub removed: usize,

    /// Whether a new-jobs notification went out
    pub notified: bool,

    pub duration: Duration,
}

/// Runs one cycle against the given collaborators
///
/// # Arguments
///
/// * `orchestrator` - Scrape runner
/// * `store` - Job store holding known jobs and run history
/// * `notifier` - Destination for new-job reports, if any
/// * `plan` - Resolved cycle settings
pub async fn run_cycle<F, S>(
    orchestrator: &Orchestrator<F>,
    store: &mut S,
    notifier: Option<&dyn Notifier>,
    plan: &CyclePlan,
) -> Result<CycleReport, WatchError>
where
    F: PageFetcher,
    S: JobStore,
{
    let started = Instant::now();
    let run_id = store.create_run(&plan.config_hash)?;
    tracing::info!("Started run #{}", run_id);

    match scrape_and_record(orchestrator, store, notifier, plan, run_id, started).await {
        Ok(report) => Ok(report),
        Err(e) => {
            tracing::error!("Run #{} failed: {}", run_id, e);
            if let Err(mark) = store.fail_run(run_id, &e.to_string()) {
                tracing::warn!("Could not mark run #{} as failed: {}", run_id, mark);
            }
            Err(e)
        }
    }
}

async fn scrape_and_record<F, S>(
    orchestrator: &Orchestrator<F>,
    store: &mut S,
    notifier: Option<&dyn Notifier>,
    plan: &CyclePlan,
    run_id: i64,
    started: Instant,
) -> Result<CycleReport, WatchError>
where
    F: PageFetcher,
    S: JobStore,
{
    let known = store.load_known_keys()?;
    tracing::info!("Loaded {} known jobs", known.len());

    let result = orchestrator
        .run(&known, plan.max_pages, plan.stop_on_known)
        .await;

    if let StopReason::Aborted { page, error } = &result.stop_reason {
        tracing::warn!(
            "Pagination ended early on page {} ({}); keeping {} jobs from earlier pages",
            page,
            error,
            result.scraped_count
        );
    }

    let inserted = store.insert_jobs(&result.jobs, run_id)?;
    tracing::info!("Saved {} new jobs", inserted);

    let notified = match notifier {
        Some(notifier) if !result.jobs.is_empty() => {
            match notifier
                .notify_new_jobs(&result.jobs, result.scraped_count)
                .await
            {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Notification failed: {}", e);
                    false
                }
            }
        }
        _ => false,
    };

    let removed = store.cleanup_old_jobs(plan.max_jobs)?;

    let summary = RunSummary {
        pages_scraped: result.pages_scraped,
        jobs_scraped: result.scraped_count as u32,
        new_jobs: inserted as u32,
        found_known_job: result.found_known_job,
    };
    store.complete_run(run_id, &summary)?;

    let duration = started.elapsed();

    if let (true, Some(notifier)) = (plan.send_summary, notifier) {
        match load_statistics(&*store, 0) {
            Ok(stats) => {
                if let Err(e) = notifier.notify_summary(&stats, duration).await {
                    tracing::warn!("Summary notification failed: {}", e);
                }
            }
            Err(e) => tracing::warn!("Could not load statistics for summary: {}", e),
        }
    }

    tracing::info!(
        "Run #{} complete: {} pages, {} scraped, {} new, {} removed in {:.1}s",
        run_id,
        result.pages_scraped,
        result.scraped_count,
        inserted,
        removed,
        duration.as_secs_f64()
    );

    Ok(CycleReport {
        run_id,
        result,
        inserted,
        removed,
        notified,
        duration,
    })
}

/// Runs one cycle with collaborators built from configuration
///
/// # Example
///
/// ```no_run
/// use workana_watch::config::load_config_with_hash;
/// use workana_watch::scrape::{run_watch, WatchOptions};
/// use std::path::Path;
///
/// # async fn example() -> workana_watch::Result<()> {
/// let (config, hash) = load_config_with_hash(Path::new("config.toml"))?;
/// let report = run_watch(&config, &hash, &WatchOptions::default()).await?;
/// println!("{} new jobs", report.inserted);
/// # Ok(())
/// # }
/// ```
pub async fn run_watch(
    config: &Config,
    config_hash: &str,
    options: &WatchOptions,
) -> Result<CycleReport, WatchError> {
    let orchestrator = Orchestrator::from_config(config)?;
    let mut store = open_storage(Path::new(&config.storage.database_path))?;

    let notifier = if options.notify {
        SlackNotifier::from_config(&config.notify)?
    } else {
        None
    };
    if options.notify && notifier.is_none() {
        tracing::info!("No Slack webhook configured; notifications disabled");
    }

    let plan = CyclePlan::new(config, config_hash, options);
    run_cycle(
        &orchestrator,
        &mut store,
        notifier.as_ref().map(|n| n as &dyn Notifier),
        &plan,
    )
    .await
}
