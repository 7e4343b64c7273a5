//! Delay between successive page fetches
//!
//! A fixed delay plus a uniformly random extra keeps the request cadence
//! within what the listing site tolerates.

use crate::config::ScraperConfig;
use std::time::Duration;

/// Delays above this are worth a log line
const NOTICEABLE_DELAY: Duration = Duration::from_millis(500);

/// Fixed-plus-random delay between page fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDelay {
    fixed_ms: u64,
    random_min_ms: u64,
    random_max_ms: u64,
}

impl PageDelay {
    /// Creates a delay of `fixed_ms` plus a random value in `[min_ms, max_ms]`
    ///
    /// An inverted range is swapped.
    pub fn new(fixed_ms: u64, min_ms: u64, max_ms: u64) -> Self {
        Self {
            fixed_ms,
            random_min_ms: min_ms.min(max_ms),
            random_max_ms: min_ms.max(max_ms),
        }
    }

    pub fn from_config(config: &ScraperConfig) -> Self {
        Self::new(
            config.delay_between_requests_ms,
            config.random_delay_min_ms,
            config.random_delay_max_ms,
        )
    }

    /// No delay at all
    pub fn none() -> Self {
        Self::new(0, 0, 0)
    }

    /// Draws the next delay
    pub fn next_delay(&self) -> Duration {
        let extra = if self.random_max_ms > self.random_min_ms {
            rand::random_range(self.random_min_ms..=self.random_max_ms)
        } else {
            self.random_min_ms
        };
        Duration::from_millis(self.fixed_ms.saturating_add(extra))
    }

    /// Suspends for the next delay
    pub async fn wait(&self) {
        let delay = self.next_delay();
        if delay > NOTICEABLE_DELAY {
            tracing::info!("Waiting {:.1} seconds before next page...", delay.as_secs_f64());
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
