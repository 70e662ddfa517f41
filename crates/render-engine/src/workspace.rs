//! Per-job scratch directories.

use std::path::{Path, PathBuf};

use vertcut_common::{VertcutError, VertcutResult};

/// Scratch directory holding a job's uploaded inputs.
///
/// Removed explicitly once the render finishes either way; the drop
/// guard catches paths that error out before reaching the explicit
/// cleanup.
#[derive(Debug)]
pub struct JobWorkspace {
    dir: Option<PathBuf>,
}

impl JobWorkspace {
    /// Create `<work_root>/<job_id>/`.
    pub async fn create(work_root: &Path, job_id: &str) -> VertcutResult<Self> {
        let dir = work_root.join(job_id);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| VertcutError::render(format!("Failed to create workspace: {e}")))?;
        Ok(Self { dir: Some(dir) })
    }

    pub fn path(&self) -> &Path {
        self.dir
            .as_deref()
            .unwrap_or_else(|| Path::new(""))
    }

    /// Path for an input file inside the workspace. Only the final
    /// component of `name` is used, so an uploaded filename cannot
    /// escape the directory.
    pub fn input_path(&self, name: &str) -> PathBuf {
        let file_name = Path::new(name)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "upload".into());
        self.path().join(file_name)
    }

    /// Remove the workspace and everything in it.
    pub async fn remove(mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(err) = tokio::fs::remove_dir_all(&dir).await {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(error = %err, dir = %dir.display(), "Failed to remove workspace");
                }
            }
        }
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(err) = std::fs::remove_dir_all(&dir) {
                if err.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(error = %err, dir = %dir.display(), "Failed to remove workspace on drop");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_root() -> PathBuf {
        std::env::temp_dir().join(format!("vertcut-test-{}", uuid::Uuid::new_v4()))
    }

    #[tokio::test]
    async fn create_and_remove_round_trip() {
        let root = scratch_root();
        let ws = JobWorkspace::create(&root, "job-1").await.unwrap();
        let dir = ws.path().to_path_buf();
        assert!(dir.exists());

        tokio::fs::write(ws.input_path("clip.mp4"), b"data")
            .await
            .unwrap();
        ws.remove().await;
        assert!(!dir.exists());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn input_path_strips_directory_components() {
        let root = scratch_root();
        let ws = JobWorkspace::create(&root, "job-2").await.unwrap();
        let path = ws.input_path("../../etc/passwd");
        assert_eq!(path, ws.path().join("passwd"));
        ws.remove().await;
        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn drop_removes_directory() {
        let root = scratch_root();
        let dir;
        {
            let ws = JobWorkspace::create(&root, "job-3").await.unwrap();
            dir = ws.path().to_path_buf();
            assert!(dir.exists());
        }
        assert!(!dir.exists());
        std::fs::remove_dir_all(&root).ok();
    }
}
