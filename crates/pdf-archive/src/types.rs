use pdf_photos::{AssembleError, SkippedPhoto};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Copy pool closed")]
    PoolClosed(#[from] tokio::sync::AcquireError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Unsafe staging path {}: must stay inside {}", path.display(), root.display())]
    UnsafePath { path: PathBuf, root: PathBuf },
    #[error("Failed to copy {} to {}: {source}", from.display(), to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Outcome of an archive export
#[derive(Debug, Default)]
pub struct ArchiveReport {
    /// Files copied into the staging area (shared photos count once)
    pub copied: usize,
    /// Per-item PDFs, relative to the archive root folder
    pub documents: Vec<String>,
    /// Files written into the archive
    pub entries: usize,
    /// Photos left out of the per-item PDFs
    pub skipped: Vec<SkippedPhoto>,
}
