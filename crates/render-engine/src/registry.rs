//! Job registry.
//!
//! Concurrent readers (progress subscribers, download handlers) and one
//! writer per job (the render executor) share the store behind a lock.
//! Every mutation goes through `update` so a reader can never observe a
//! partially written job.

use std::collections::HashMap;
use std::sync::Mutex;

use vertcut_common::{VertcutError, VertcutResult};
use vertcut_timeline_model::Job;

/// Generate a fresh job identifier.
pub fn new_job_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Storage for render jobs.
///
/// Terminal states are write-once: once a job reads `Done` or `Error`,
/// later updates are dropped. Updating a job that was cleared from the
/// store mid-render is a no-op, not an error, so a cache clear cannot
/// crash an executor that is still reporting progress.
pub trait JobStore: Send + Sync {
    fn insert(&self, job: Job) -> VertcutResult<()>;

    fn get(&self, id: &str) -> VertcutResult<Job>;

    /// Apply a mutation to the stored job atomically.
    fn update(&self, id: &str, mutate: &mut dyn FnMut(&mut Job)) -> VertcutResult<()>;

    fn count(&self) -> usize;

    /// Remove all jobs, returning how many were dropped.
    fn clear(&self) -> usize;
}

/// In-process job store.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<HashMap<String, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Job>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl JobStore for InMemoryJobStore {
    fn insert(&self, job: Job) -> VertcutResult<()> {
        let mut jobs = self.lock();
        if jobs.contains_key(&job.id) {
            return Err(VertcutError::validation(format!(
                "job {} already exists",
                job.id
            )));
        }
        jobs.insert(job.id.clone(), job);
        Ok(())
    }

    fn get(&self, id: &str) -> VertcutResult<Job> {
        self.lock()
            .get(id)
            .cloned()
            .ok_or_else(|| VertcutError::job_not_found(id))
    }

    fn update(&self, id: &str, mutate: &mut dyn FnMut(&mut Job)) -> VertcutResult<()> {
        let mut jobs = self.lock();
        match jobs.get_mut(id) {
            Some(job) if job.status.is_terminal() => {
                tracing::debug!(job_id = id, "Ignoring update to terminal job");
            }
            Some(job) => mutate(job),
            None => {
                tracing::debug!(job_id = id, "Ignoring update to missing job");
            }
        }
        Ok(())
    }

    fn count(&self) -> usize {
        self.lock().len()
    }

    fn clear(&self) -> usize {
        let mut jobs = self.lock();
        let dropped = jobs.len();
        jobs.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vertcut_timeline_model::JobStatus;

    #[test]
    fn insert_and_get_round_trip() {
        let store = InMemoryJobStore::new();
        store.insert(Job::new("j1")).unwrap();
        let job = store.get("j1").unwrap();
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = InMemoryJobStore::new();
        store.insert(Job::new("j1")).unwrap();
        assert!(store.insert(Job::new("j1")).is_err());
    }

    #[test]
    fn missing_job_is_not_found() {
        let store = InMemoryJobStore::new();
        assert!(matches!(
            store.get("ghost"),
            Err(VertcutError::JobNotFound { .. })
        ));
    }

    #[test]
    fn update_mutates_atomically() {
        let store = InMemoryJobStore::new();
        store.insert(Job::new("j1")).unwrap();
        store
            .update("j1", &mut |job| {
                job.progress = 42;
            })
            .unwrap();
        assert_eq!(store.get("j1").unwrap().progress, 42);
    }

    #[test]
    fn terminal_state_is_write_once() {
        let store = InMemoryJobStore::new();
        store.insert(Job::new("j1")).unwrap();
        store
            .update("j1", &mut |job| {
                job.status = JobStatus::Done;
                job.progress = 100;
            })
            .unwrap();
        store
            .update("j1", &mut |job| {
                job.status = JobStatus::Error;
                job.progress = 7;
                job.error = Some("late failure".to_string());
            })
            .unwrap();

        let job = store.get("j1").unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert_eq!(job.progress, 100);
        assert!(job.error.is_none());
    }

    #[test]
    fn update_after_clear_is_silent() {
        let store = InMemoryJobStore::new();
        store.insert(Job::new("j1")).unwrap();
        assert_eq!(store.clear(), 1);
        store
            .update("j1", &mut |job| {
                job.progress = 50;
            })
            .unwrap();
        assert_eq!(store.count(), 0);
    }
}
