//! Archive export
//!
//! An archive export runs in phases:
//! 1. Validate the destination and options
//! 2. Create the staging root and resolve the working directories
//! 3. Plan and run the photo copies
//! 4. Write one PDF per item from the rewritten graph
//! 5. Write the rewritten graph as metadata
//! 6. Replace the target archive with the compressed working directory
//!
//! The staging root is removed whether or not the export succeeds.

use crate::compress::compress_dir;
use crate::copy::{Copier, FsCopier, run_copy_tasks};
use crate::namer::DocumentNames;
use crate::options::ArchiveOptions;
use crate::staging::{StagingPaths, StagingPlan};
use crate::types::*;
use crate::workspace::TempWorkspace;
use pdf_photos::{
    AssembleOptions, Graph, ItemSource, copy_verbatim, export_pdf, validate_extension,
};
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// Builds portable archives from photo graphs
pub struct ArchiveBuilder<C: Copier = FsCopier> {
    options: ArchiveOptions,
    copier: Arc<C>,
}

impl ArchiveBuilder<FsCopier> {
    pub fn new(options: ArchiveOptions) -> Self {
        Self {
            options,
            copier: Arc::new(FsCopier),
        }
    }
}

impl<C: Copier> ArchiveBuilder<C> {
    /// Use `copier` for the photo copy phase
    pub fn with_copier<D: Copier>(self, copier: D) -> ArchiveBuilder<D> {
        ArchiveBuilder {
            options: self.options,
            copier: Arc::new(copier),
        }
    }

    pub fn options(&self) -> &ArchiveOptions {
        &self.options
    }

    /// Export `graph` as a ZIP archive at `target`
    pub async fn build(&self, graph: &Graph, target: impl AsRef<Path>) -> Result<ArchiveReport> {
        let target = target.as_ref();
        validate_extension(target, "zip")?;
        self.options.validate()?;

        let root_folder = self.options.root_folder_for(target);
        let workspace = TempWorkspace::create(self.options.temp_parent.as_deref())?;

        let result = self
            .stage_and_compress(graph, target, workspace.path(), &root_folder)
            .await;
        workspace.cleanup().await;

        match &result {
            Ok(report) => log::info!(
                "Wrote archive {} ({} file(s), {} document(s))",
                target.display(),
                report.entries,
                report.documents.len()
            ),
            Err(err) => log::error!("Archive export to {} failed: {}", target.display(), err),
        }
        result
    }

    async fn stage_and_compress(
        &self,
        graph: &Graph,
        target: &Path,
        temp_root: &Path,
        root_folder: &str,
    ) -> Result<ArchiveReport> {
        let paths = StagingPaths::resolve(temp_root, root_folder, &self.options.images_dir)?;
        tokio::fs::create_dir_all(&paths.images_dir).await?;

        let plan = StagingPlan::build(graph, &paths, &self.options.metadata_file);
        let copied = plan.tasks.len();
        log::info!("Copying {} photo(s) into the archive", copied);
        run_copy_tasks(
            self.copier.clone(),
            plan.tasks.clone(),
            self.options.concurrency,
        )
        .await?;

        let staged = plan.apply(graph);
        let mut report = ArchiveReport {
            copied,
            ..Default::default()
        };
        let mut names = DocumentNames::new();
        names.reserve(self.options.metadata_file.clone());
        if paths.is_flat() {
            plan.file_names().for_each(|name| names.reserve(name));
        } else if let Some(images) = paths.images_rel.components().next() {
            names.reserve(images.as_os_str().to_string_lossy().into_owned());
        }
        self.write_item_documents(graph, &staged, &paths.working_dir, names, &mut report)
            .await?;

        let metadata = serde_json::to_vec_pretty(&staged)?;
        write_synced(&paths.working_dir.join(&self.options.metadata_file), &metadata).await?;

        remove_existing(target).await;
        report.entries = compress_dir(
            paths.working_dir.clone(),
            root_folder.to_string(),
            target.to_owned(),
        )
        .await?;

        Ok(report)
    }

    /// One PDF per item with photos. Items that are pages of one PDF are
    /// decided on their source paths, since staging names pages apart.
    async fn write_item_documents(
        &self,
        graph: &Graph,
        staged: &Graph,
        working_dir: &Path,
        mut names: DocumentNames,
        report: &mut ArchiveReport,
    ) -> Result<()> {
        let options = AssembleOptions {
            layout: self.options.layout(),
            base_dir: Some(working_dir.to_owned()),
        };

        for (item_idx, (source, item)) in graph.items.iter().zip(&staged.items).enumerate() {
            let Some(first) = item.photos.first() else {
                continue;
            };

            let name = names.claim(item.title.as_deref(), "pdf");
            let destination = working_dir.join(&name);
            if ItemSource::for_item(source).is_passthrough() && first.is_local() {
                copy_verbatim(first.resolve_path(Some(working_dir)), &destination).await?;
                report.documents.push(name);
                continue;
            }

            let item_graph = Graph::new(vec![item.clone()]);
            let item_report = export_pdf(&item_graph, &destination, &options).await?;

            report
                .skipped
                .extend(item_report.skipped.into_iter().map(|mut skipped| {
                    skipped.item_index = item_idx;
                    skipped
                }));
            report.documents.push(name);
        }

        Ok(())
    }
}

/// Export `graph` as a ZIP archive with the default copier
pub async fn export_archive(
    graph: &Graph,
    target: impl AsRef<Path>,
    options: &ArchiveOptions,
) -> Result<ArchiveReport> {
    ArchiveBuilder::new(options.clone())
        .build(graph, target)
        .await
}

async fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    Ok(())
}

/// Remove a previous archive at `target`; errors other than a missing file
/// are logged and ignored
async fn remove_existing(target: &Path) {
    match tokio::fs::remove_file(target).await {
        Ok(()) => log::debug!("Removed existing archive {}", target.display()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => log::warn!(
            "Could not remove existing archive {}: {}",
            target.display(),
            err
        ),
    }
}
