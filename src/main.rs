//! Workana-Watch main entry point
//!
//! This is the command-line interface for the Workana-Watch job watcher.

use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use workana_watch::config::{load_config_with_hash, Config};
use workana_watch::output::{load_statistics, print_statistics};
use workana_watch::scrape::{run_watch, WatchOptions};
use workana_watch::storage::{JobStore, SqliteStorage};
use workana_watch::url::JobsUrlBuilder;
use workana_watch::StopReason;

/// Jobs listed by --stats
const RECENT_JOBS_SHOWN: usize = 10;

/// Workana-Watch: an incremental job-listing watcher
///
/// Workana-Watch walks the job listing newest-first, stops at the first job
/// it has already seen, stores what is new and posts it to Slack.
#[derive(Parser, Debug)]
#[command(name = "workana-watch")]
#[command(version = "1.0.0")]
#[command(about = "An incremental job-listing watcher", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Scrape every page instead of stopping at the first known job
    #[arg(long)]
    backfill: bool,

    /// Override the configured page cap (0 = no cap)
    #[arg(long, value_name = "N")]
    max_pages: Option<u32>,

    /// Do not send Slack notifications
    #[arg(long)]
    no_notify: bool,

    /// Validate config and show what would be scraped without scraping
    #[arg(long, conflicts_with_all = ["stats", "cleanup"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "cleanup"])]
    stats: bool,

    /// Trim the database to the configured job limit and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    cleanup: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let options = WatchOptions {
        backfill: cli.backfill,
        max_pages: cli.max_pages,
        notify: !cli.no_notify,
    };

    if cli.dry_run {
        handle_dry_run(&config, &options)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.cleanup {
        handle_cleanup(&config)?;
    } else {
        handle_watch(&config, &config_hash, &options).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("workana_watch=info,warn"),
            1 => EnvFilter::new("workana_watch=debug,info"),
            2 => EnvFilter::new("workana_watch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be scraped
fn handle_dry_run(config: &Config, options: &WatchOptions) -> Result<(), Box<dyn std::error::Error>> {
    let scraper = &config.scraper;
    let urls = JobsUrlBuilder::from_config(scraper)?;

    println!("=== Workana-Watch Dry Run ===\n");

    println!("Listing:");
    println!("  Category: {}", scraper.category);
    println!("  Language: {}", scraper.language);
    println!("  Publication: {}", scraper.publication);
    println!("  Page 1: {}", urls.page_url(1));
    println!("  Page 2: {}", urls.page_url(2));

    let max_pages = options.max_pages.or(scraper.max_pages).filter(|&n| n > 0);
    println!("\nTraversal:");
    match max_pages {
        Some(n) => println!("  Max pages: {}", n),
        None => println!("  Max pages: unlimited"),
    }
    println!(
        "  Stop on known job: {}",
        scraper.stop_on_known_job && !options.backfill
    );
    println!(
        "  Delay: {}ms + random {}-{}ms",
        scraper.delay_between_requests_ms, scraper.random_delay_min_ms, scraper.random_delay_max_ms
    );
    println!("  Page timeout: {}s", scraper.page_load_timeout_secs);

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);
    println!("  Max jobs kept: {}", config.storage.max_jobs);

    println!("\nNotifications:");
    match (&config.notify.slack_webhook_url, options.notify) {
        (Some(_), true) => println!(
            "  Slack: enabled ({})",
            if config.notify.per_job { "one message per job" } else { "digest" }
        ),
        (Some(_), false) => println!("  Slack: disabled by --no-notify"),
        (None, _) => println!("  Slack: not configured"),
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("Database: {}\n", config.storage.database_path);

    let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
    let stats = load_statistics(&storage, RECENT_JOBS_SHOWN)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --cleanup mode: keeps only the newest jobs
fn handle_cleanup(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;

    let before = storage.count_jobs()?;
    let removed = storage.cleanup_old_jobs(config.storage.max_jobs)?;

    println!(
        "✓ Removed {} of {} jobs (keeping at most {})",
        removed, before, config.storage.max_jobs
    );

    Ok(())
}

/// Handles the main watch cycle
async fn handle_watch(
    config: &Config,
    config_hash: &str,
    options: &WatchOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if options.backfill {
        tracing::info!("Backfill mode: scraping every page");
    }

    match run_watch(config, config_hash, options).await {
        Ok(report) => {
            match &report.result.stop_reason {
                StopReason::FoundKnownJob { page } => {
                    tracing::info!("Stopped on page {} at a known job", page)
                }
                StopReason::LastPage => tracing::info!("Reached the last page"),
                StopReason::Aborted { page, error } => {
                    tracing::warn!("Stopped on page {}: {}", page, error)
                }
            }
            tracing::info!(
                "Watch completed: {} new jobs in {:.1}s",
                report.inserted,
                report.duration.as_secs_f64()
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Watch failed: {}", e);
            Err(e.into())
        }
    }
}
