//! Bounded photo copy pool

use crate::staging::CopyTask;
use crate::types::*;
use std::io;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Blocking file copy used by the pool
pub trait Copier: Send + Sync + 'static {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64>;
}

/// Plain filesystem copy
#[derive(Debug, Clone, Copy, Default)]
pub struct FsCopier;

impl Copier for FsCopier {
    fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
        std::fs::copy(from, to)
    }
}

/// Run every copy with at most `concurrency` in flight.
///
/// Returns the number of bytes copied. The first failure closes the pool so
/// tasks still waiting for a slot give up; copies already running are
/// awaited before the error is returned.
pub async fn run_copy_tasks<C: Copier>(
    copier: Arc<C>,
    tasks: Vec<CopyTask>,
    concurrency: usize,
) -> Result<u64> {
    let semaphore = Arc::new(Semaphore::new(concurrency.clamp(1, Semaphore::MAX_PERMITS)));
    let mut set = JoinSet::new();

    for task in tasks {
        let semaphore = semaphore.clone();
        let copier = copier.clone();

        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let copied = tokio::task::spawn_blocking(move || {
                copier
                    .copy(&task.source, &task.destination)
                    .map_err(|source| ArchiveError::Copy {
                        from: task.source,
                        to: task.destination,
                        source,
                    })
            })
            .await??;
            Ok::<u64, ArchiveError>(copied)
        });
    }

    let mut total = 0;
    while let Some(joined) = set.join_next().await {
        match joined.map_err(ArchiveError::from).and_then(|result| result) {
            Ok(copied) => total += copied,
            Err(err) => {
                // Blocking copies cannot be cancelled; let them finish
                semaphore.close();
                while let Some(joined) = set.join_next().await {
                    if let Ok(Err(other)) = joined {
                        if !matches!(other, ArchiveError::PoolClosed(_)) {
                            log::debug!("Copy failed after abort: {}", other);
                        }
                    }
                }
                return Err(err);
            }
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Records how many copies overlap
    #[derive(Default)]
    struct CountingCopier {
        running: AtomicUsize,
        peak: AtomicUsize,
        done: Mutex<Vec<PathBuf>>,
        fail_on: Option<PathBuf>,
    }

    impl Copier for CountingCopier {
        fn copy(&self, from: &Path, to: &Path) -> io::Result<u64> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(5));
            self.running.fetch_sub(1, Ordering::SeqCst);

            if self.fail_on.as_deref() == Some(from) {
                return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
            }
            self.done.lock().unwrap().push(to.to_owned());
            Ok(1)
        }
    }

    fn tasks(count: usize) -> Vec<CopyTask> {
        (0..count)
            .map(|i| CopyTask {
                source: PathBuf::from(format!("/src/{i}.jpg")),
                destination: PathBuf::from(format!("/dst/{i}.jpg")),
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let copier = Arc::new(CountingCopier::default());
        let copied = run_copy_tasks(copier.clone(), tasks(40), 3).await.unwrap();

        assert_eq!(copied, 40);
        assert_eq!(copier.done.lock().unwrap().len(), 40);
        let peak = copier.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= 3, "peak was {peak}");
    }

    #[tokio::test]
    async fn test_first_failure_is_returned() {
        let copier = Arc::new(CountingCopier {
            fail_on: Some(PathBuf::from("/src/0.jpg")),
            ..Default::default()
        });

        let result = run_copy_tasks(copier.clone(), tasks(10), 1).await;
        match result {
            Err(ArchiveError::Copy { from, .. }) => assert_eq!(from, PathBuf::from("/src/0.jpg")),
            other => panic!("Expected copy error, got {other:?}"),
        }
        assert!(copier.done.lock().unwrap().len() < 10);
    }

    /// Copies of `/src/slow.jpg` take a while, `/src/bad.jpg` fails fast
    #[derive(Default)]
    struct SlowCopier {
        running: AtomicUsize,
        started: AtomicUsize,
    }

    impl Copier for SlowCopier {
        fn copy(&self, from: &Path, _to: &Path) -> io::Result<u64> {
            self.started.fetch_add(1, Ordering::SeqCst);
            self.running.fetch_add(1, Ordering::SeqCst);
            let result = if from == Path::new("/src/bad.jpg") {
                std::thread::sleep(Duration::from_millis(20));
                Err(io::Error::other("disk full"))
            } else {
                let delay = if from == Path::new("/src/slow.jpg") { 300 } else { 1 };
                std::thread::sleep(Duration::from_millis(delay));
                Ok(1)
            };
            self.running.fetch_sub(1, Ordering::SeqCst);
            result
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failure_waits_for_running_copies() {
        let copier = Arc::new(SlowCopier::default());
        let mut all = vec![
            CopyTask {
                source: PathBuf::from("/src/slow.jpg"),
                destination: PathBuf::from("/dst/slow.jpg"),
            },
            CopyTask {
                source: PathBuf::from("/src/bad.jpg"),
                destination: PathBuf::from("/dst/bad.jpg"),
            },
        ];
        all.extend(tasks(50));

        let result = run_copy_tasks(copier.clone(), all, 2).await;
        assert!(matches!(result, Err(ArchiveError::Copy { .. })));
        // The slow copy finished before the error came back
        assert_eq!(copier.running.load(Ordering::SeqCst), 0);
        assert!(copier.started.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_no_tasks() {
        let copied = run_copy_tasks(Arc::new(FsCopier), Vec::new(), 64).await.unwrap();
        assert_eq!(copied, 0);
    }
}
