//! Render job lifecycle state.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a render job. `Done` and `Error` are terminal and
/// are written exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Done,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }
}

/// An asynchronous unit of render work.
///
/// Created when a render request is accepted, mutated only by the render
/// executor, read by progress subscribers and the download handler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,

    pub status: JobStatus,

    /// Percentage in `[0, 100]`; reaches 100 only on the `Done`
    /// transition.
    pub progress: u8,

    /// Final artifact path, present once known.
    pub output_path: Option<PathBuf>,

    /// Human-readable failure message when `status == Error`.
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: JobStatus::Processing,
            progress: 0,
            output_path: None,
            error: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_job_is_processing_at_zero() {
        let job = Job::new("j1");
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 0);
        assert!(job.error.is_none());
    }

    #[test]
    fn terminal_states() {
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }
}
