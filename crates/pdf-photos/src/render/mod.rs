//! PDF rendering modules for photo pages
//!
//! This module handles all PDF-specific operations:
//! - Embedding photos as image XObjects
//! - Importing pages of existing PDFs as Form XObjects
//! - Building canvas pages and their transformation commands

mod page;
mod raster;
mod xobject;

pub use page::*;
pub use raster::{PhotoImage, decode_image, load_image};
pub use xobject::{ImportedPage, copy_object_deep, import_page};
