use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("not a {expected} file: {}", path.display())]
    InvalidDestination { path: PathBuf, expected: &'static str },
    #[error("cannot copy {} onto itself", path.display())]
    SameFile { path: PathBuf },
    #[error("Invalid assembler state: cannot {action} while {state:?}")]
    InvalidState {
        action: &'static str,
        state: AssemblerState,
    },
}

pub type Result<T> = std::result::Result<T, AssembleError>;

/// Why a photo did not produce a page.
#[derive(Error, Debug)]
pub enum SkipReason {
    #[error("photo is not backed by a local file (protocol {0:?})")]
    NotLocal(String),
    #[error("unreadable file: {0}")]
    Unreadable(#[from] std::io::Error),
    #[error("unsupported image format: {0}")]
    Unsupported(String),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
    #[error("invalid PDF: {0}")]
    InvalidPdf(#[from] lopdf::Error),
}

/// Lifecycle of a single assembly run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// Document created, no page open
    Opened,
    /// A page is open and still empty
    PageAdded,
    /// Content was drawn on the open page
    ImageDrawn,
    /// The last page was closed
    PageClosed,
    /// The document was finalized; no further changes
    Finalized,
}

/// A photo that was left out of the output document
#[derive(Debug)]
pub struct SkippedPhoto {
    pub item_index: usize,
    pub photo_index: usize,
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Outcome of a direct export or a per-item document build
#[derive(Debug, Default)]
pub struct AssemblyReport {
    /// Pages emitted into the output document (0 for a verbatim copy)
    pub pages: usize,
    /// True when the output is a byte copy of an imported PDF
    pub passthrough: bool,
    pub skipped: Vec<SkippedPhoto>,
}
