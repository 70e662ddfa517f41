//! Progress broadcasting.
//!
//! Subscribers get a channel fed by a poller over the job store. The
//! channel closes after the first terminal event, and a subscription to
//! an unknown job yields exactly one error event before closing.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use vertcut_timeline_model::JobStatus;

use crate::registry::JobStore;

/// One progress update as delivered to a subscriber.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: JobStatus,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Subscribe to a job's progress.
///
/// Spawns a poller that snapshots the job every `poll_interval` and
/// forwards the snapshot. The receiver ends after the terminal event;
/// dropping it stops the poller on its next tick.
pub fn watch_job(
    store: Arc<dyn JobStore>,
    job_id: String,
    poll_interval: Duration,
) -> mpsc::Receiver<ProgressEvent> {
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        loop {
            let event = match store.get(&job_id) {
                Ok(job) => ProgressEvent {
                    status: job.status,
                    progress: job.progress,
                    error: job.error,
                },
                Err(err) => {
                    let _ = tx
                        .send(ProgressEvent {
                            status: JobStatus::Error,
                            progress: 0,
                            error: Some(err.to_string()),
                        })
                        .await;
                    break;
                }
            };

            let terminal = event.status.is_terminal();
            if tx.send(event).await.is_err() {
                tracing::debug!(job_id, "Progress subscriber went away");
                break;
            }
            if terminal {
                break;
            }

            tokio::time::sleep(poll_interval).await;
        }
    });

    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InMemoryJobStore;
    use vertcut_timeline_model::Job;

    fn store_with(job: Job) -> Arc<dyn JobStore> {
        let store = InMemoryJobStore::new();
        store.insert(job).unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn unknown_job_yields_single_error_event() {
        let store: Arc<dyn JobStore> = Arc::new(InMemoryJobStore::new());
        let mut rx = watch_job(store, "ghost".to_string(), Duration::from_millis(5));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.status, JobStatus::Error);
        assert!(event.error.unwrap().contains("ghost"));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn stream_closes_after_terminal_event() {
        let mut job = Job::new("j1");
        job.status = JobStatus::Done;
        job.progress = 100;
        let mut rx = watch_job(store_with(job), "j1".to_string(), Duration::from_millis(5));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.status, JobStatus::Done);
        assert_eq!(event.progress, 100);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn running_job_is_observed_until_done() {
        let store = Arc::new(InMemoryJobStore::new());
        store.insert(Job::new("j1")).unwrap();

        let mut rx = watch_job(
            store.clone() as Arc<dyn JobStore>,
            "j1".to_string(),
            Duration::from_millis(5),
        );

        let first = rx.recv().await.unwrap();
        assert_eq!(first.status, JobStatus::Processing);

        store
            .update("j1", &mut |job| {
                job.status = JobStatus::Done;
                job.progress = 100;
            })
            .unwrap();

        let mut last = first;
        while let Some(event) = rx.recv().await {
            last = event;
        }
        assert_eq!(last.status, JobStatus::Done);
        assert_eq!(last.progress, 100);
    }
}
