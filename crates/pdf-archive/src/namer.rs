//! File names inside the archive
//!
//! Photos are named `{index:02}_{title}{ext}`, where the index counts the
//! photo's position within its item. A name already claimed by the same
//! content key is reused; one claimed by other content gets the checksum,
//! then a counter, appended.

use pdf_photos::Photo;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

/// Placeholder for missing or empty titles
pub const UNTITLED: &str = "untitled";

/// Strip characters that are invalid in file names on common platforms
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Sanitized title, or [`UNTITLED`] when nothing usable is left
pub fn title_or_untitled(title: Option<&str>) -> String {
    let name = sanitize_file_name(title.unwrap_or_default());
    if name.is_empty() {
        UNTITLED.to_string()
    } else {
        name
    }
}

/// Identity of a photo's content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentKey {
    Checksum(String),
    /// Photos without a checksum are identified by their source file
    Source(PathBuf),
}

impl ContentKey {
    pub fn of(photo: &Photo) -> Self {
        match &photo.checksum {
            Some(checksum) => ContentKey::Checksum(checksum.clone()),
            None => ContentKey::Source(photo.path.clone()),
        }
    }
}

/// A name handed out by [`ArchiveNamer::claim`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameClaim {
    pub name: String,
    /// False when the name was already claimed for the same content
    pub is_new: bool,
}

/// Dedup map of photo names to content keys
#[derive(Debug, Default)]
pub struct ArchiveNamer {
    claimed: HashMap<String, ContentKey>,
    reserved: HashSet<String>,
}

impl ArchiveNamer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `name` free of photos, e.g. for the metadata file
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.reserved.insert(name.into());
    }

    /// Name the photo at 1-based `index` within its item
    pub fn claim(&mut self, index: usize, photo: &Photo) -> NameClaim {
        let key = ContentKey::of(photo);
        let stem = format!("{:02}_{}", index, title_or_untitled(photo.title.as_deref()));
        let extension = photo
            .path
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy()))
            .unwrap_or_default();

        let mut candidates = vec![format!("{stem}{extension}")];
        let stem = match photo.checksum.as_deref().map(sanitize_file_name) {
            Some(checksum) if !checksum.is_empty() => {
                let stem = format!("{stem}_{checksum}");
                candidates.push(format!("{stem}{extension}"));
                stem
            }
            _ => stem,
        };

        let name = candidates
            .into_iter()
            .chain((2..).map(|n| format!("{stem}_{n}{extension}")))
            .find(|name| {
                !self.reserved.contains(name)
                    && self.claimed.get(name).is_none_or(|owner| *owner == key)
            })
            .unwrap_or_default();

        let is_new = !self.claimed.contains_key(&name);
        if is_new {
            self.claimed.insert(name.clone(), key);
        }
        NameClaim { name, is_new }
    }

    /// Every name handed out so far
    pub fn claimed_names(&self) -> impl Iterator<Item = &str> {
        self.claimed.keys().map(String::as_str)
    }
}

/// Unique names for per-item documents
#[derive(Debug, Default)]
pub struct DocumentNames {
    taken: HashSet<String>,
}

impl DocumentNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `name` for a file that is not a per-item document
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    /// `{title}.{extension}`, with `_2`, `_3`, … appended on repeats
    pub fn claim(&mut self, title: Option<&str>, extension: &str) -> String {
        let stem = title_or_untitled(title);
        let mut name = format!("{stem}.{extension}");
        let mut n = 2;
        while !self.taken.insert(name.clone()) {
            name = format!("{stem}_{n}.{extension}");
            n += 1;
        }
        name
    }
}
