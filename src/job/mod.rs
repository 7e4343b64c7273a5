//! Job data model
//!
//! # Components
//!
//! - `JobRecord`: one listing as parsed from the site
//! - `KnownIdSet`: read-only snapshot of composite keys persisted by earlier runs
//! - `ScrapeResult`: what one run produced and why it stopped

mod known;
mod record;
mod result;

pub use known::KnownIdSet;
pub use record::{composite_key, JobRecord};
pub use result::{ScrapeResult, StopReason};
