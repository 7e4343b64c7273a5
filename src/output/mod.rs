//! Output module for terminal reports
//!
//! This module handles:
//! - Loading job and run statistics from the store
//! - Rendering statistics and run reports for the terminal

pub mod stats;

pub use stats::{load_statistics, print_statistics, JobStatistics, NEW_JOBS_WINDOW_HOURS};
