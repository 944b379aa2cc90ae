//! Rotation planning
//!
//! Combines the EXIF-style orientation tag with a manual rotation into one
//! clockwise angle in `[0, 360)`.

/// Normalized rotation of a photo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RotationPlan {
    /// Clockwise rotation in degrees, always in `[0, 360)`
    pub degrees: u16,
    /// Whether width and height trade places for layout purposes
    pub swaps_dimensions: bool,
}

impl RotationPlan {
    /// Apply the swap flag to a (width, height) pair
    pub fn effective_size(&self, width: f32, height: f32) -> (f32, f32) {
        if self.swaps_dimensions {
            (height, width)
        } else {
            (width, height)
        }
    }
}

/// Clockwise offset contributed by an orientation tag
pub fn orientation_offset(orientation: i64) -> i64 {
    match orientation {
        3 => 180,
        6 => 90,
        8 => -90,
        _ => 0,
    }
}

/// Compose the manual angle and the orientation offset.
///
/// The manual angle comes first and the orientation offset is added to it,
/// then the sum is reduced into `[0, 360)`.
pub fn plan_rotation(orientation: i64, manual_angle: i64) -> RotationPlan {
    let degrees = (manual_angle.rem_euclid(360) + orientation_offset(orientation)).rem_euclid(360);

    RotationPlan {
        degrees: degrees as u16,
        swaps_dimensions: degrees == 90 || degrees == 270,
    }
}
