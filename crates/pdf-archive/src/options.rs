use crate::types::*;
use pdf_photos::{LayoutOptions, MarginPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};
use tokio::sync::Semaphore;

/// Default number of photo copies in flight
pub const DEFAULT_CONCURRENCY: usize = 64;
pub const DEFAULT_METADATA_FILE: &str = "items.json";

/// Archive export configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveOptions {
    /// Maximum number of concurrent photo copies
    pub concurrency: usize,
    /// Photo directory inside the archive root folder; empty puts photos
    /// next to the item PDFs
    pub images_dir: PathBuf,
    /// Name of the rewritten graph snapshot
    pub metadata_file: String,
    /// Top-level folder of the archive; defaults to the archive file stem
    pub root_folder: Option<String>,
    /// Where the temporary staging root is created; defaults to the system
    /// temp directory
    pub temp_parent: Option<PathBuf>,
    /// Margins of the per-item PDFs
    pub margin_policy: MarginPolicy,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            images_dir: PathBuf::new(),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
            root_folder: None,
            temp_parent: None,
            margin_policy: MarginPolicy::default(),
        }
    }
}

impl ArchiveOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| ArchiveError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(ArchiveError::Config(
                "Concurrency must be at least 1".to_string(),
            ));
        }
        if self.concurrency > Semaphore::MAX_PERMITS {
            return Err(ArchiveError::Config(format!(
                "Concurrency must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }

        let metadata = Path::new(&self.metadata_file);
        let mut components = metadata.components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(ArchiveError::Config(format!(
                "Metadata file must be a plain file name, got {:?}",
                self.metadata_file
            )));
        }

        Ok(())
    }

    /// Name of the archive's top-level folder for `target`
    pub fn root_folder_for(&self, target: &Path) -> String {
        match &self.root_folder {
            Some(folder) => folder.clone(),
            None => target
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    pub fn layout(&self) -> LayoutOptions {
        LayoutOptions {
            margin_policy: self.margin_policy,
            ..Default::default()
        }
    }
}
