//! Layout data types for photo pages
//!
//! These types sit between rotation planning and PDF rendering.

use crate::constants::{A4_HEIGHT_PT, A4_WIDTH_PT, LANDSCAPE_MARGIN_PT, MIN_MARGIN_PT};
use serde::{Deserialize, Serialize};

/// A rectangular area in points
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// X position (left edge)
    pub x: f32,
    /// Y position (bottom edge)
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Top edge y coordinate
    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

/// The output page. Every page of a document uses the same canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Canvas {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl Canvas {
    /// ISO A4, portrait
    pub const A4: Canvas = Canvas {
        width_pt: A4_WIDTH_PT,
        height_pt: A4_HEIGHT_PT,
    };

    pub fn center(&self) -> (f32, f32) {
        (self.width_pt / 2.0, self.height_pt / 2.0)
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas::A4
    }
}

/// How much blank space surrounds a photo on its page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarginPolicy {
    /// Minimum printable margin on every side
    #[default]
    Uniform,
    /// Minimum margin left/right; landscape photos get a wider top/bottom band
    OrientationAware,
}

/// Page margins in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMargins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl PageMargins {
    /// Create uniform margins on all sides
    pub fn uniform(margin: f32) -> Self {
        Self {
            top: margin,
            bottom: margin,
            left: margin,
            right: margin,
        }
    }
}

impl MarginPolicy {
    /// Margins for a photo whose effective (post-swap) size is given
    pub fn margins_for(self, effective_width: f32, effective_height: f32) -> PageMargins {
        match self {
            MarginPolicy::Uniform => PageMargins::uniform(MIN_MARGIN_PT),
            MarginPolicy::OrientationAware if effective_width > effective_height => PageMargins {
                top: LANDSCAPE_MARGIN_PT,
                bottom: LANDSCAPE_MARGIN_PT,
                left: MIN_MARGIN_PT,
                right: MIN_MARGIN_PT,
            },
            MarginPolicy::OrientationAware => PageMargins::uniform(MIN_MARGIN_PT),
        }
    }
}

/// Layout settings shared by every page of an export
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutOptions {
    pub canvas: Canvas,
    pub margin_policy: MarginPolicy,
}

/// Final placement of a photo on its page
///
/// The image is drawn at its original proportions around `center`, then
/// turned clockwise by `rotation_degrees`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlacement {
    /// Area left for content once the margins are removed
    pub available: Rect,
    /// Page point the image pivots around
    pub center: (f32, f32),
    /// Clockwise rotation in degrees
    pub rotation_degrees: u16,
    pub swaps_dimensions: bool,
    pub scale: f32,
    /// Drawn width (original width × scale)
    pub drawn_width: f32,
    /// Drawn height (original height × scale)
    pub drawn_height: f32,
}

impl ImagePlacement {
    /// Space the image occupies on the page once rotated
    pub fn footprint(&self) -> (f32, f32) {
        if self.swaps_dimensions {
            (self.drawn_height, self.drawn_width)
        } else {
            (self.drawn_width, self.drawn_height)
        }
    }
}
