//! Shared constants for photo page assembly
//!
//! This module centralizes the page geometry and the format tags used
//! throughout the assembly process.

// =============================================================================
// Canvas
// =============================================================================

/// A4 portrait width in points (210mm)
pub const A4_WIDTH_PT: f32 = 595.28;

/// A4 portrait height in points (297mm)
pub const A4_HEIGHT_PT: f32 = 841.89;

// =============================================================================
// Margins
// =============================================================================

/// Minimum printable margin: 0.25 inch
pub const MIN_MARGIN_PT: f32 = 7.2;

/// Top/bottom margin for landscape photos under the orientation-aware policy
pub const LANDSCAPE_MARGIN_PT: f32 = 50.0;

// =============================================================================
// Photo Metadata
// =============================================================================

/// Protocol tag of photos backed by a local file
pub const FILE_PROTOCOL: &str = "file";

/// Mimetype of photos imported from a PDF document
pub const PDF_MIMETYPE: &str = "application/pdf";

/// Resource name of the image drawn on each photo page
pub const IMAGE_RESOURCE_NAME: &str = "Im0";

/// Resource name of an imported PDF page
pub const FORM_RESOURCE_NAME: &str = "Fm0";
