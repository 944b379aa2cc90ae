pub mod assemble;
pub mod constants;
mod graph;
pub mod layout;
mod passthrough;
pub mod render;
mod types;

pub use assemble::{
    AssembleOptions, DocumentAssembler, PhotoOutcome, assemble, copy_verbatim, export_pdf,
    load_pdf, save_pdf, single_passthrough_source, validate_extension,
};
pub use graph::*;
pub use layout::{LayoutOptions, MarginPolicy};
pub use passthrough::ItemSource;
pub use types::*;
