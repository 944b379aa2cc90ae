//! Render-or-copy decision per item
//!
//! An item whose photos are all pages of one imported PDF is exported as a
//! byte copy of that PDF instead of being re-rendered.

use crate::graph::{Item, Photo};
use std::path::Path;

/// How an item contributes to the output
#[derive(Debug, Clone, PartialEq)]
pub enum ItemSource<'a> {
    /// Copy this PDF verbatim
    Passthrough(&'a Path),
    /// Render one page per photo
    Render(&'a [Photo]),
}

impl<'a> ItemSource<'a> {
    /// Resolve the source of an item's photo list
    pub fn resolve(photos: &'a [Photo]) -> Self {
        match photos.split_first() {
            Some((first, rest))
                if first.is_pdf()
                    && rest
                        .iter()
                        .all(|photo| photo.is_pdf() && photo.path == first.path) =>
            {
                ItemSource::Passthrough(&first.path)
            }
            _ => ItemSource::Render(photos),
        }
    }

    pub fn for_item(item: &'a Item) -> Self {
        Self::resolve(&item.photos)
    }

    pub fn is_passthrough(&self) -> bool {
        matches!(self, ItemSource::Passthrough(_))
    }
}
