use crate::job::JobRecord;
use std::collections::HashSet;

/// Composite keys already persisted by earlier runs
///
/// A run receives this as a read-only snapshot. New keys only enter the set
/// by building a new snapshot (`with_jobs`) after the caller persisted a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownIdSet {
    keys: HashSet<String>,
}

impl KnownIdSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a set from already-built composite keys
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the composite key is known
    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Returns true if the job's composite key is known
    pub fn contains(&self, job: &JobRecord) -> bool {
        self.contains_key(&job.key())
    }

    /// Returns a new snapshot that also knows the given jobs
    pub fn with_jobs(&self, jobs: &[JobRecord]) -> Self {
        let mut keys = self.keys.clone();
        keys.extend(jobs.iter().filter(|j| j.is_usable()).map(JobRecord::key));
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str, client: &str) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            client_name: client.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_contains_by_composite_key() {
        let known = KnownIdSet::from_keys(["J1|Acme"]);
        assert!(known.contains(&job("J1", "Acme")));
        assert!(!known.contains(&job("J1", "Beta")));
        assert!(known.contains_key("J1|Acme"));
    }

    #[test]
    fn test_with_jobs_leaves_original_untouched() {
        let known = KnownIdSet::from_keys(["J1|Acme"]);
        let extended = known.with_jobs(&[job("J2", "Beta"), job("", "Ghost")]);

        assert_eq!(known.len(), 1);
        assert_eq!(extended.len(), 2);
        assert!(extended.contains(&job("J2", "Beta")));
        assert!(!extended.contains_key("|Ghost"));
    }

    #[test]
    fn test_empty_set() {
        let known = KnownIdSet::new();
        assert!(known.is_empty());
        assert!(!known.contains(&job("J1", "Acme")));
    }
}
