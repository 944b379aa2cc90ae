//! Services the embedding application provides

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// A named group of file extensions offered by a save dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

impl FileFilter {
    pub fn new(name: impl Into<String>, extensions: &[&str]) -> Self {
        Self {
            name: name.into(),
            extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    /// Suggested destination, possibly just a file name
    pub default_path: PathBuf,
    pub filters: Vec<FileFilter>,
}

/// Asks the user where to save an export
pub trait SaveDialog {
    /// `None` when the user cancels
    fn save(&self, request: &SaveRequest) -> Option<PathBuf>;
}

/// Hands exported files to the desktop
pub trait Opener {
    /// Open a file with its default application
    fn open_path(&self, path: &Path) -> io::Result<()>;

    /// Reveal a file in the system file manager
    fn show_in_folder(&self, path: &Path) -> io::Result<()>;
}
