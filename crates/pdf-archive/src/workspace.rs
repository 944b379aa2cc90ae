//! Temporary staging root

use crate::types::*;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const CLEANUP_ATTEMPTS: u32 = 3;
const CLEANUP_BASE_DELAY_MS: u64 = 50;

/// Back-off before the next cleanup attempt: `base * 2^attempt`, capped
/// at one second
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt));
    Duration::from_millis(delay.min(1_000))
}

/// Uniquely named directory that holds an archive while it is assembled
#[derive(Debug)]
pub struct TempWorkspace {
    dir: TempDir,
}

impl TempWorkspace {
    /// Create the workspace under `parent`, or the system temp directory
    pub fn create(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("photopdf-");
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        log::debug!("Created staging root {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the workspace; failures are logged, never returned
    pub async fn cleanup(self) {
        let path = self.dir.path().to_owned();

        for attempt in 0..CLEANUP_ATTEMPTS {
            match tokio::fs::remove_dir_all(&path).await {
                Ok(()) => {
                    log::debug!("Removed staging root {}", path.display());
                    return;
                }
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => return,
                Err(err) => {
                    log::warn!(
                        "Failed to remove staging root {} (attempt {}/{}): {}",
                        path.display(),
                        attempt + 1,
                        CLEANUP_ATTEMPTS,
                        err
                    );
                    if attempt + 1 < CLEANUP_ATTEMPTS {
                        tokio::time::sleep(backoff_duration(attempt, CLEANUP_BASE_DELAY_MS)).await;
                    }
                }
            }
        }

        log::error!("Giving up on staging root {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert_eq!(backoff_duration(0, 50), Duration::from_millis(50));
        assert_eq!(backoff_duration(1, 50), Duration::from_millis(100));
        assert_eq!(backoff_duration(2, 50), Duration::from_millis(200));
        assert_eq!(backoff_duration(10, 50), Duration::from_millis(1_000));
    }

    #[tokio::test]
    async fn test_workspace_is_removed() {
        let parent = tempfile::TempDir::new().unwrap();
        let workspace = TempWorkspace::create(Some(parent.path())).unwrap();
        let path = workspace.path().to_owned();
        std::fs::create_dir_all(path.join("bundle/images")).unwrap();
        std::fs::write(path.join("bundle/items.json"), b"{}").unwrap();

        assert!(path.starts_with(parent.path()));
        workspace.cleanup().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_cleanup_tolerates_missing_root() {
        let workspace = TempWorkspace::create(None).unwrap();
        std::fs::remove_dir_all(workspace.path()).unwrap();
        workspace.cleanup().await;
    }
}
