pub mod builder;
pub mod compress;
pub mod copy;
pub mod namer;
mod options;
pub mod staging;
mod types;
pub mod workspace;

pub use builder::{ArchiveBuilder, export_archive};
pub use copy::{Copier, FsCopier};
pub use namer::{ArchiveNamer, sanitize_file_name};
pub use options::*;
pub use types::*;
