//! Layout calculation modules for photo pages
//!
//! This module handles all the geometric calculations:
//! - Rotation planning (orientation tag + manual angle)
//! - Margin policies and the available box on the canvas
//! - Scale and centered placement of the drawn image

mod placement;
mod rotation;
mod types;

pub use placement::*;
pub use rotation::*;
pub use types::*;
