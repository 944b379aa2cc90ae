//! Export flow: pick a destination, write the output, hand it to the desktop

use crate::host::{Opener, SaveDialog, SaveRequest};
use crate::options::ExportOptions;
use crate::types::*;
use pdf_archive::{ArchiveBuilder, ArchiveReport, sanitize_file_name};
use pdf_photos::{AssembleOptions, AssemblyReport, Graph};
use std::path::{Path, PathBuf};

/// Name used when the graph offers no usable title
pub const DEFAULT_EXPORT_NAME: &str = "export";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// One assembled PDF
    Pdf,
    /// ZIP bundle of photos, per-item PDFs and metadata
    Archive,
}

impl ExportKind {
    pub fn extension(self) -> &'static str {
        match self {
            ExportKind::Pdf => "pdf",
            ExportKind::Archive => "zip",
        }
    }

    /// `{first item title}.{ext}`, or `export.{ext}`
    pub fn default_file_name(self, graph: &Graph) -> String {
        let stem = graph
            .first_title()
            .map(sanitize_file_name)
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| DEFAULT_EXPORT_NAME.to_string());
        format!("{}.{}", stem, self.extension())
    }
}

/// What a finished export produced
#[derive(Debug)]
pub enum ExportOutcome {
    Pdf { path: PathBuf, report: AssemblyReport },
    Archive { path: PathBuf, report: ArchiveReport },
}

impl ExportOutcome {
    pub fn path(&self) -> &Path {
        match self {
            ExportOutcome::Pdf { path, .. } | ExportOutcome::Archive { path, .. } => path,
        }
    }
}

/// Runs exports against the host's dialog and opener
pub struct Exporter<'a> {
    options: ExportOptions,
    base_dir: Option<PathBuf>,
    dialog: Option<&'a dyn SaveDialog>,
    opener: Option<&'a dyn Opener>,
}

impl<'a> Exporter<'a> {
    pub fn new(options: ExportOptions) -> Self {
        Self {
            options,
            base_dir: None,
            dialog: None,
            opener: None,
        }
    }

    /// Resolve relative photo paths against `base_dir`
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_dialog(mut self, dialog: &'a dyn SaveDialog) -> Self {
        self.dialog = Some(dialog);
        self
    }

    pub fn with_opener(mut self, opener: &'a dyn Opener) -> Self {
        self.opener = Some(opener);
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Export `graph`; `Ok(None)` when the user cancelled the save dialog
    pub async fn export(&self, kind: ExportKind, graph: &Graph) -> Result<Option<ExportOutcome>> {
        self.options.validate()?;

        let Some(path) = self.destination(kind, graph)? else {
            log::info!("Export cancelled");
            return Ok(None);
        };
        log::info!("Exporting {} item(s) to {}", graph.items.len(), path.display());

        let outcome = match kind {
            ExportKind::Pdf => {
                let options = AssembleOptions {
                    layout: self.options.layout(),
                    base_dir: self.base_dir.clone(),
                };
                let report = pdf_photos::export_pdf(graph, &path, &options).await?;
                ExportOutcome::Pdf { path, report }
            }
            ExportKind::Archive => {
                let graph = self.rebased(graph);
                let report = ArchiveBuilder::new(self.options.archive_options())
                    .build(&graph, &path)
                    .await?;
                ExportOutcome::Archive { path, report }
            }
        };

        if self.options.open_after_export {
            self.reveal(&outcome);
        }
        Ok(Some(outcome))
    }

    /// The configured destination, or the user's choice from the dialog
    fn destination(&self, kind: ExportKind, graph: &Graph) -> Result<Option<PathBuf>> {
        if !self.options.prompt {
            if let Some(destination) = &self.options.destination {
                return Ok(Some(destination.clone()));
            }
        }

        let dialog = self.dialog.ok_or(ExportError::NoDestination)?;
        let filter = match kind {
            ExportKind::Pdf => &self.options.pdf_filter,
            ExportKind::Archive => &self.options.archive_filter,
        };
        let request = SaveRequest {
            default_path: self
                .options
                .destination
                .clone()
                .unwrap_or_else(|| PathBuf::from(kind.default_file_name(graph))),
            filters: vec![filter.clone()],
        };

        Ok(dialog.save(&request))
    }

    /// Archive staging copies by absolute path
    fn rebased(&self, graph: &Graph) -> Graph {
        let mut graph = graph.clone();
        if let Some(base) = &self.base_dir {
            for photo in graph.items.iter_mut().flat_map(|item| item.photos.iter_mut()) {
                if photo.is_local() {
                    photo.path = photo.resolve_path(Some(base));
                }
            }
        }
        graph
    }

    fn reveal(&self, outcome: &ExportOutcome) {
        let Some(opener) = self.opener else {
            return;
        };

        let result = match outcome {
            ExportOutcome::Pdf { path, .. } => opener.open_path(path),
            ExportOutcome::Archive { path, .. } => opener.show_in_folder(path),
        };
        if let Err(err) = result {
            log::warn!("Could not open {}: {}", outcome.path().display(), err);
        }
    }
}
