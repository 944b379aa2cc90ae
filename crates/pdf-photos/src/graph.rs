//! Photo graph data model
//!
//! The graph is the unit of export: an ordered list of items, each holding
//! an ordered list of photos. Fields this crate does not interpret are kept
//! in `extra` so a graph survives a load/save round trip unchanged.

use crate::constants::{FILE_PROTOCOL, PDF_MIMETYPE};
use crate::layout::{RotationPlan, plan_rotation};
use crate::types::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// An ordered collection of items, serialized under `@graph`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Graph {
    #[serde(rename = "@graph", default)]
    pub items: Vec<Item>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A catalog entry; photo order is page order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Item {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "photo", default)]
    pub photos: Vec<Photo>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photo {
    pub path: PathBuf,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    /// EXIF orientation tag; only 1, 3, 6 and 8 are meaningful
    #[serde(default = "default_orientation")]
    pub orientation: i64,
    /// Manual rotation in degrees
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<i64>,
    #[serde(default)]
    pub mimetype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_orientation() -> i64 {
    1
}

/// Position of a photo inside a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PhotoKey {
    pub item: usize,
    pub photo: usize,
}

impl PhotoKey {
    pub fn new(item: usize, photo: usize) -> Self {
        Self { item, photo }
    }
}

impl Graph {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            extra: Map::new(),
        }
    }

    /// Parse a graph from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Load a graph from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_slice(&bytes)
    }

    /// Save the graph as pretty-printed JSON
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// All photos in graph order, with their keys
    pub fn photos(&self) -> impl Iterator<Item = (PhotoKey, &Photo)> {
        self.items.iter().enumerate().flat_map(|(item_idx, item)| {
            item.photos
                .iter()
                .enumerate()
                .map(move |(photo_idx, photo)| (PhotoKey::new(item_idx, photo_idx), photo))
        })
    }

    /// Title of the first item, used to suggest an output file name
    pub fn first_title(&self) -> Option<&str> {
        self.items
            .first()
            .and_then(|item| item.title.as_deref())
            .filter(|title| !title.trim().is_empty())
    }
}

impl Item {
    pub fn new(title: impl Into<String>, photos: Vec<Photo>) -> Self {
        Self {
            title: Some(title.into()),
            photos,
            extra: Map::new(),
        }
    }
}

impl Photo {
    /// A locally stored photo with identity orientation
    pub fn new(path: impl Into<PathBuf>, width: u32, height: u32, mimetype: &str) -> Self {
        Self {
            path: path.into(),
            width,
            height,
            orientation: 1,
            angle: None,
            mimetype: mimetype.to_string(),
            protocol: Some(FILE_PROTOCOL.to_string()),
            checksum: None,
            title: None,
            extra: Map::new(),
        }
    }

    pub fn with_orientation(mut self, orientation: i64) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_angle(mut self, angle: i64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Whether the photo is backed by a local file (a missing tag counts as local)
    pub fn is_local(&self) -> bool {
        self.protocol
            .as_deref()
            .is_none_or(|protocol| protocol == FILE_PROTOCOL)
    }

    pub fn is_pdf(&self) -> bool {
        self.mimetype == PDF_MIMETYPE
    }

    /// Effective rotation of this photo
    pub fn rotation(&self) -> RotationPlan {
        plan_rotation(self.orientation, self.angle.unwrap_or(0))
    }

    /// The photo's file, with relative paths resolved against `base`
    pub fn resolve_path(&self, base: Option<&Path>) -> PathBuf {
        match base {
            Some(base) if self.path.is_relative() => base.join(&self.path),
            _ => self.path.clone(),
        }
    }
}
