//! Process-wide store of job status snapshots

use crate::types::{JobId, JobStatus};
use std::collections::HashMap;
use std::sync::RwLock;

/// Mapping from [`JobId`] to the job's current [`JobStatus`]
///
/// Every write replaces a whole status value under the lock, and every read
/// clones the value out, so a reader never sees a partially written status.
/// Entries are never removed.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, JobStatus>>,
}

impl JobRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a fresh job with [`JobStatus::Starting`]
    ///
    /// The caller guarantees `id` is fresh; an existing entry is overwritten.
    pub fn create(&self, id: JobId) {
        self.set(id, JobStatus::starting());
    }

    /// Replace the stored status for `id`
    pub fn set(&self, id: JobId, status: JobStatus) {
        // A panic while holding the lock cannot leave a half-written value
        // behind, so a poisoned map is still consistent.
        let mut jobs = self.jobs.write().unwrap_or_else(|e| e.into_inner());
        jobs.insert(id, status);
    }

    /// Snapshot of the status for `id`, or [`JobStatus::NotFound`]
    pub fn get(&self, id: &JobId) -> JobStatus {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        jobs.get(id).cloned().unwrap_or(JobStatus::NotFound)
    }

    /// Number of jobs ever created in this process
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no job has been created yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
