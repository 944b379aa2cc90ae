//! Staging layout and photo path rewriting
//!
//! The staging plan is computed up front, single-threaded, before any copy
//! starts. It maps every staged photo to its path relative to the archive
//! root folder and rewrites a clone of the graph with that mapping.

use crate::namer::ArchiveNamer;
use crate::types::*;
use pdf_photos::{Graph, PhotoKey};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Lexically normalize an absolute or relative path; `None` if `..` climbs
/// above its start
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir | Component::Normal(_) => {
                normalized.push(component)
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if !matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                ) {
                    return None;
                }
                normalized.pop();
            }
        }
    }
    Some(normalized)
}

fn check_descendant(root: &Path, candidate: &Path, allow_equal: bool) -> Result<PathBuf> {
    let unsafe_path = || ArchiveError::UnsafePath {
        path: candidate.to_owned(),
        root: root.to_owned(),
    };

    let root = normalize(root).ok_or_else(unsafe_path)?;
    let resolved = normalize(&root.join(candidate)).ok_or_else(unsafe_path)?;

    if resolved.starts_with(&root) && (allow_equal || resolved != root) {
        Ok(resolved)
    } else {
        Err(unsafe_path())
    }
}

/// Resolve `candidate` against `root`, failing unless the result lies
/// strictly below `root`
pub fn ensure_strict_descendant(root: &Path, candidate: &Path) -> Result<PathBuf> {
    check_descendant(root, candidate, false)
}

/// Directories used while staging an archive
#[derive(Debug, Clone, PartialEq)]
pub struct StagingPaths {
    /// Root folder of the archive content
    pub working_dir: PathBuf,
    /// Where photos are copied
    pub images_dir: PathBuf,
    /// `images_dir` relative to `working_dir`
    pub images_rel: PathBuf,
}

impl StagingPaths {
    /// Check and resolve the staging directories under `temp_root`
    pub fn resolve(temp_root: &Path, root_folder: &str, images_dir: &Path) -> Result<Self> {
        let working_dir = ensure_strict_descendant(temp_root, Path::new(root_folder))?;
        let images = ensure_strict_descendant(temp_root, &working_dir.join(images_dir))?;
        // The photos must end up inside the compressed folder
        let images_rel = images
            .strip_prefix(&working_dir)
            .map(Path::to_path_buf)
            .map_err(|_| ArchiveError::UnsafePath {
                path: images_dir.to_owned(),
                root: working_dir.clone(),
            })?;

        Ok(Self {
            working_dir,
            images_dir: images,
            images_rel,
        })
    }

    /// Photos are copied straight into the working directory
    pub fn is_flat(&self) -> bool {
        self.images_rel.as_os_str().is_empty()
    }
}

/// One photo file to copy into the staging area
#[derive(Debug, Clone, PartialEq)]
pub struct CopyTask {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Copy tasks plus the photo path mapping for one archive
#[derive(Debug, Default)]
pub struct StagingPlan {
    pub tasks: Vec<CopyTask>,
    mapping: BTreeMap<PhotoKey, PathBuf>,
}

impl StagingPlan {
    /// Name every local photo of `graph`; shared content is copied once.
    ///
    /// When photos sit directly in the working directory they never take
    /// the name of `metadata_file`.
    pub fn build(graph: &Graph, paths: &StagingPaths, metadata_file: &str) -> Self {
        let mut namer = ArchiveNamer::new();
        if paths.is_flat() {
            namer.reserve(metadata_file);
        }
        let mut plan = StagingPlan::default();

        for (key, photo) in graph.photos() {
            if !photo.is_local() {
                continue;
            }

            let claim = namer.claim(key.photo + 1, photo);
            if claim.is_new {
                plan.tasks.push(CopyTask {
                    source: photo.path.clone(),
                    destination: paths.images_dir.join(&claim.name),
                });
            }
            plan.mapping.insert(key, paths.images_rel.join(&claim.name));
        }

        plan
    }

    /// File names of the copies, in copy order
    pub fn file_names(&self) -> impl Iterator<Item = String> + '_ {
        self.tasks.iter().filter_map(|task| {
            task.destination
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
    }

    /// Archive-relative path of a staged photo
    pub fn staged_path(&self, key: PhotoKey) -> Option<&Path> {
        self.mapping.get(&key).map(PathBuf::as_path)
    }

    /// A copy of `graph` whose staged photos point into the archive
    pub fn apply(&self, graph: &Graph) -> Graph {
        let mut staged = graph.clone();
        for (key, path) in &self.mapping {
            if let Some(photo) = staged
                .items
                .get_mut(key.item)
                .and_then(|item| item.photos.get_mut(key.photo))
            {
                photo.path = path.clone();
            }
        }
        staged
    }
}
