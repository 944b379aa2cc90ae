use crate::host::FileFilter;
use crate::types::*;
use pdf_archive::ArchiveOptions;
use pdf_photos::{LayoutOptions, MarginPolicy};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Export configuration shared by both export kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Destination file; the save dialog is used when unset
    pub destination: Option<PathBuf>,
    /// Always ask for the destination, suggesting `destination` if set
    pub prompt: bool,
    pub pdf_filter: FileFilter,
    pub archive_filter: FileFilter,
    /// Open the PDF, or reveal the archive, once written
    pub open_after_export: bool,
    pub margin_policy: MarginPolicy,
    pub archive: ArchiveOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            destination: None,
            prompt: false,
            pdf_filter: FileFilter::new("PDF Files", &["pdf"]),
            archive_filter: FileFilter::new("ZIP Archives", &["zip"]),
            open_after_export: true,
            margin_policy: MarginPolicy::default(),
            archive: ArchiveOptions::default(),
        }
    }
}

impl ExportOptions {
    /// Load options from JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| ExportError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ExportError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        for filter in [&self.pdf_filter, &self.archive_filter] {
            if filter.extensions.is_empty() {
                return Err(ExportError::Config(format!(
                    "File filter {:?} has no extensions",
                    filter.name
                )));
            }
        }
        self.archive.validate()?;
        Ok(())
    }

    pub fn layout(&self) -> LayoutOptions {
        LayoutOptions {
            margin_policy: self.margin_policy,
            ..Default::default()
        }
    }

    /// Archive options carrying this export's margin policy
    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            margin_policy: self.margin_policy,
            ..self.archive.clone()
        }
    }
}
