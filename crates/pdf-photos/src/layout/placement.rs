//! Photo placement on the canvas
//!
//! This module handles calculating where and how large a photo is drawn:
//! - Margins, chosen by the margin policy from the effective orientation
//! - A uniform fit scale computed from the effective (post-swap) size
//! - A drawn size computed from the original (pre-swap) size
//!
//! The rotation is applied as a page-space transform around the canvas
//! center, so only the layout box swaps, never the drawn image.

use super::{ImagePlacement, LayoutOptions, PageMargins, Rect, RotationPlan};

/// Area of the canvas left once the margins are removed
pub fn available_area(options: &LayoutOptions, margins: &PageMargins) -> Rect {
    let canvas = options.canvas;
    Rect::new(
        margins.left,
        margins.bottom,
        (canvas.width_pt - margins.left - margins.right).max(0.0),
        (canvas.height_pt - margins.top - margins.bottom).max(0.0),
    )
}

/// Uniform scale that fits the source inside the target
pub fn calculate_scale(
    source_width: f32,
    source_height: f32,
    target_width: f32,
    target_height: f32,
) -> f32 {
    let scale_w = target_width / source_width;
    let scale_h = target_height / source_height;
    scale_w.min(scale_h)
}

/// Lay out a photo of `width` × `height` pixels with the given rotation.
///
/// Callers must pass positive dimensions.
pub fn place_photo(
    options: &LayoutOptions,
    width: f32,
    height: f32,
    rotation: RotationPlan,
) -> ImagePlacement {
    let (effective_width, effective_height) = rotation.effective_size(width, height);
    let margins = options
        .margin_policy
        .margins_for(effective_width, effective_height);
    let available = available_area(options, &margins);

    let scale = calculate_scale(
        effective_width,
        effective_height,
        available.width,
        available.height,
    );

    ImagePlacement {
        available,
        center: options.canvas.center(),
        rotation_degrees: rotation.degrees,
        swaps_dimensions: rotation.swaps_dimensions,
        scale,
        drawn_width: width * scale,
        drawn_height: height * scale,
    }
}
