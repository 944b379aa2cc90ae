//! Export glue between a host application and the photo exporters

mod export;
mod host;
mod options;
mod types;

pub use export::*;
pub use host::*;
pub use options::*;
pub use types::*;

// Re-export types from library crates
pub use pdf_archive::{ArchiveOptions, ArchiveReport};
pub use pdf_photos::{AssemblyReport, Graph, MarginPolicy};
