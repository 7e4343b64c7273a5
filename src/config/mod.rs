//! Configuration module for Workana-Watch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use workana_watch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Listing category: {}", config.scraper.category);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{Config, NotifyConfig, ScraperConfig, SelectorConfig, StorageConfig};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash,
    SLACK_WEBHOOK_ENV,
};
pub use validation::validate;
