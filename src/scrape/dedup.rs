//! Deduplication of scraped records against known keys

use crate::job::{JobRecord, KnownIdSet};
use std::collections::HashSet;

/// Records split by whether they are new to this run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    /// Records whose key is neither known nor seen earlier in the batch
    pub new: Vec<JobRecord>,

    /// Records whose key was already known
    pub known: Vec<JobRecord>,

    /// Repeats of a key seen earlier in the same batch
    pub duplicates: usize,

    /// Records dropped for lacking an id
    pub unusable: usize,
}

/// Splits `records` into new and known, first occurrence wins
///
/// Order within each bucket follows input order. Records without an id are
/// dropped; a repeated key inside the batch is counted once.
///
/// # Example
///
/// ```
/// use workana_watch::{dedup_filter, JobRecord, KnownIdSet};
///
/// let job = |id: &str| JobRecord { id: id.to_string(), ..Default::default() };
/// let known = KnownIdSet::from_keys(["J1|"]);
///
/// let split = dedup_filter(vec![job("J1"), job("J2"), job("J2")], &known);
/// assert_eq!(split.new.len(), 1);
/// assert_eq!(split.known.len(), 1);
/// assert_eq!(split.duplicates, 1);
/// ```
pub fn dedup_filter(records: Vec<JobRecord>, known: &KnownIdSet) -> Partition {
    let mut partition = Partition::default();
    let mut seen = HashSet::new();

    for record in records {
        if !record.is_usable() {
            partition.unusable += 1;
            continue;
        }

        let key = record.key();
        if !seen.insert(key.clone()) {
            partition.duplicates += 1;
            continue;
        }

        if known.contains_key(&key) {
            partition.known.push(record);
        } else {
            partition.new.push(record);
        }
    }

    if partition.duplicates > 0 || partition.unusable > 0 {
        tracing::debug!(
            "Dropped {} duplicate and {} unusable records",
            partition.duplicates,
            partition.unusable
        );
    }

    partition
}
