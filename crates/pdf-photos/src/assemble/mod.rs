//! Photo document assembly
//!
//! This module drives page emission:
//! 1. Resolve each item to a render or copy source
//! 2. Lay out every local photo on its own canvas page
//! 3. Skip unreadable or unsupported photos, recording why
//! 4. Finalize the page tree and flush the document to disk

mod io;

pub use io::{copy_verbatim, load_pdf, save_pdf, validate_extension};

use crate::constants::{FORM_RESOURCE_NAME, IMAGE_RESOURCE_NAME};
use crate::graph::{Graph, Photo};
use crate::layout::{ImagePlacement, LayoutOptions, place_photo, plan_rotation};
use crate::passthrough::ItemSource;
use crate::render::{
    ImportedPage, PhotoImage, add_page_object, form_placement_command, image_placement_command,
    import_page, load_image,
};
use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Settings for one assembly run
#[derive(Debug, Clone, Default)]
pub struct AssembleOptions {
    pub layout: LayoutOptions,
    /// Directory that relative photo paths are resolved against
    pub base_dir: Option<PathBuf>,
}

/// Result of offering one photo to the assembler
#[derive(Debug)]
pub enum PhotoOutcome {
    Drawn,
    Skipped(SkipReason),
}

/// Content of the page currently being built
#[derive(Default)]
struct OpenPage {
    content: String,
    xobjects: Dictionary,
}

/// Page-by-page builder of an output document.
///
/// Starts with no pages. Each page goes through add, draw, close; the
/// document is handed out once by [`DocumentAssembler::finalize`].
pub struct DocumentAssembler {
    document: Document,
    pages_tree_id: ObjectId,
    page_refs: Vec<Object>,
    layout: LayoutOptions,
    state: AssemblerState,
    current: Option<OpenPage>,
}

impl DocumentAssembler {
    pub fn new(layout: LayoutOptions) -> Self {
        let mut document = Document::with_version("1.7");
        let pages_tree_id = document.new_object_id();
        Self {
            document,
            pages_tree_id,
            page_refs: Vec::new(),
            layout,
            state: AssemblerState::Opened,
            current: None,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    pub fn page_count(&self) -> usize {
        self.page_refs.len()
    }

    /// Open a new canvas-sized page
    pub fn add_page(&mut self) -> Result<()> {
        self.expect(
            "add a page",
            &[AssemblerState::Opened, AssemblerState::PageClosed],
        )?;
        self.current = Some(OpenPage::default());
        self.state = AssemblerState::PageAdded;
        Ok(())
    }

    /// Draw a photo on the open page
    pub fn draw_image(&mut self, image: &PhotoImage, placement: &ImagePlacement) -> Result<()> {
        self.expect("draw an image", &[AssemblerState::PageAdded])?;
        let image_id = image.add_to(&mut self.document);
        self.draw(IMAGE_RESOURCE_NAME, image_id, |name| {
            image_placement_command(name, placement)
        })
    }

    /// Draw an imported PDF page on the open page
    pub fn draw_imported(&mut self, page: &ImportedPage, placement: &ImagePlacement) -> Result<()> {
        self.expect("draw an imported page", &[AssemblerState::PageAdded])?;
        self.draw(FORM_RESOURCE_NAME, page.xobject_id, |name| {
            form_placement_command(name, placement, page.origin)
        })
    }

    fn draw(
        &mut self,
        name: &str,
        xobject_id: ObjectId,
        command: impl FnOnce(&str) -> String,
    ) -> Result<()> {
        let page = self.current.get_or_insert_with(OpenPage::default);
        page.xobjects.set(name, Object::Reference(xobject_id));
        page.content.push_str(&command(name));
        self.state = AssemblerState::ImageDrawn;
        Ok(())
    }

    /// Close the open page and append it to the page tree
    pub fn close_page(&mut self) -> Result<()> {
        self.expect("close a page", &[AssemblerState::ImageDrawn])?;
        let page = self.current.take().unwrap_or_default();
        let page_id = add_page_object(
            &mut self.document,
            self.pages_tree_id,
            &self.layout.canvas,
            page.content,
            page.xobjects,
        );
        self.page_refs.push(Object::Reference(page_id));
        self.state = AssemblerState::PageClosed;
        Ok(())
    }

    /// Write the page tree and catalog and hand out the document
    pub fn finalize(&mut self) -> Result<Document> {
        self.expect(
            "finalize",
            &[AssemblerState::Opened, AssemblerState::PageClosed],
        )?;

        let mut document = std::mem::replace(&mut self.document, Document::with_version("1.7"));
        let page_refs = std::mem::take(&mut self.page_refs);

        let count = page_refs.len() as i64;
        let pages_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(page_refs)),
            ("Count", Object::Integer(count)),
        ]);
        document
            .objects
            .insert(self.pages_tree_id, Object::Dictionary(pages_dict));

        let catalog_id = document.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(self.pages_tree_id)),
        ]));
        document.trailer.set("Root", catalog_id);

        self.state = AssemblerState::Finalized;
        Ok(document)
    }

    /// Add one page showing `photo`, or report why it cannot be shown
    pub fn append_photo(&mut self, photo: &Photo, base_dir: Option<&Path>) -> Result<PhotoOutcome> {
        if !photo.is_local() {
            let protocol = photo.protocol.clone().unwrap_or_default();
            return Ok(PhotoOutcome::Skipped(SkipReason::NotLocal(protocol)));
        }

        let image = match load_image(&photo.resolve_path(base_dir)) {
            Ok(image) => image,
            Err(reason) => return Ok(PhotoOutcome::Skipped(reason)),
        };

        // Metadata may lack the pixel size; the decoded image always has it
        let (width, height) = if photo.width > 0 && photo.height > 0 {
            (photo.width, photo.height)
        } else {
            (image.width, image.height)
        };
        let placement = place_photo(
            &self.layout,
            width as f32,
            height as f32,
            photo.rotation(),
        );

        self.add_page()?;
        self.draw_image(&image, &placement)?;
        self.close_page()?;
        Ok(PhotoOutcome::Drawn)
    }

    /// Add one page per page of `source`, each fitted to the canvas
    pub fn append_pdf(&mut self, source: &Document) -> Result<usize> {
        let mut cache = HashMap::new();
        let mut added = 0;

        for page_id in source.get_pages().into_values() {
            let page = import_page(&mut self.document, source, page_id, &mut cache)?;
            if page.width <= 0.0 || page.height <= 0.0 {
                log::warn!("Skipping imported page with an empty MediaBox");
                continue;
            }
            let placement = place_photo(
                &self.layout,
                page.width,
                page.height,
                plan_rotation(1, page.rotate),
            );

            self.add_page()?;
            self.draw_imported(&page, &placement)?;
            self.close_page()?;
            added += 1;
        }

        Ok(added)
    }

    fn expect(&self, action: &'static str, allowed: &[AssemblerState]) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(AssembleError::InvalidState {
                action,
                state: self.state,
            })
        }
    }
}

// =============================================================================
// Graph Assembly
// =============================================================================

/// Build the output document for a whole graph
pub async fn assemble(graph: &Graph, options: &AssembleOptions) -> Result<(Document, AssemblyReport)> {
    let graph = graph.clone();
    let options = options.clone();

    // PDF generation and image decoding are CPU-bound
    tokio::task::spawn_blocking(move || assemble_sync(&graph, &options)).await?
}

fn assemble_sync(graph: &Graph, options: &AssembleOptions) -> Result<(Document, AssemblyReport)> {
    let base_dir = options.base_dir.as_deref();
    let mut assembler = DocumentAssembler::new(options.layout);
    let mut report = AssemblyReport::default();

    for (item_idx, item) in graph.items.iter().enumerate() {
        match ItemSource::for_item(item) {
            ItemSource::Passthrough(path) => {
                let path = resolve(path, base_dir);
                append_pdf_file(&mut assembler, &mut report, &path, (item_idx, 0))?;
            }
            ItemSource::Render(photos) => {
                // PDFs are only taken whole; inside a rendered item they
                // fail to decode and are reported as unsupported
                for (photo_idx, photo) in photos.iter().enumerate() {
                    if let PhotoOutcome::Skipped(reason) =
                        assembler.append_photo(photo, base_dir)?
                    {
                        let path = photo.resolve_path(base_dir);
                        match reason {
                            SkipReason::NotLocal(_) => {
                                log::debug!("Skipping non-local photo {}", path.display())
                            }
                            _ => log::warn!("Skipping photo {}: {}", path.display(), reason),
                        }
                        report.skipped.push(SkippedPhoto {
                            item_index: item_idx,
                            photo_index: photo_idx,
                            path,
                            reason,
                        });
                    }
                }
            }
        }
    }

    report.pages = assembler.page_count();
    let document = assembler.finalize()?;
    Ok((document, report))
}

/// Import every page of the PDF at `path`, reporting it as skipped when it
/// cannot be read
fn append_pdf_file(
    assembler: &mut DocumentAssembler,
    report: &mut AssemblyReport,
    path: &Path,
    (item_index, photo_index): (usize, usize),
) -> Result<()> {
    let reason = match std::fs::read(path) {
        Ok(bytes) => match Document::load_mem(&bytes) {
            Ok(source) => {
                assembler.append_pdf(&source)?;
                return Ok(());
            }
            Err(err) => SkipReason::InvalidPdf(err),
        },
        Err(err) => SkipReason::Unreadable(err),
    };

    log::warn!("Skipping PDF {}: {}", path.display(), reason);
    report.skipped.push(SkippedPhoto {
        item_index,
        photo_index,
        path: path.to_owned(),
        reason,
    });
    Ok(())
}

/// The single PDF a graph reduces to, when every item with photos is a
/// passthrough of the same file
pub fn single_passthrough_source(graph: &Graph, base_dir: Option<&Path>) -> Option<PathBuf> {
    let mut source: Option<&Path> = None;

    for item in graph.items.iter().filter(|item| !item.photos.is_empty()) {
        match ItemSource::for_item(item) {
            ItemSource::Passthrough(path) if source.is_none_or(|seen| seen == path) => {
                source = Some(path);
            }
            _ => return None,
        }
    }

    source.map(|path| resolve(path, base_dir))
}

/// Export a graph to a single PDF file.
///
/// The destination must end in `.pdf`; this is checked before any I/O.
pub async fn export_pdf(
    graph: &Graph,
    output_path: impl AsRef<Path>,
    options: &AssembleOptions,
) -> Result<AssemblyReport> {
    let output_path = output_path.as_ref();
    validate_extension(output_path, "pdf")?;

    if let Some(source) = single_passthrough_source(graph, options.base_dir.as_deref()) {
        log::info!(
            "Copying {} verbatim to {}",
            source.display(),
            output_path.display()
        );
        copy_verbatim(&source, output_path).await?;
        return Ok(AssemblyReport {
            pages: 0,
            passthrough: true,
            skipped: Vec::new(),
        });
    }

    let (document, report) = assemble(graph, options).await?;
    save_pdf(document, output_path).await?;
    log::info!(
        "Wrote {} page(s) to {} ({} skipped)",
        report.pages,
        output_path.display(),
        report.skipped.len()
    );
    Ok(report)
}

fn resolve(path: &Path, base_dir: Option<&Path>) -> PathBuf {
    match base_dir {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_owned(),
    }
}
