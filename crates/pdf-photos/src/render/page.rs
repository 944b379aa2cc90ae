//! Output page rendering
//!
//! Every photo page is drawn with the same three-step transform:
//! translate to the pivot, rotate clockwise, then draw the image centered
//! on the origin at its original proportions.

use crate::layout::{Canvas, ImagePlacement};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

// =============================================================================
// Content Stream Commands
// =============================================================================

/// Content stream that draws an image XObject (a unit square) with `placement`.
pub fn image_placement_command(xobject_name: &str, placement: &ImagePlacement) -> String {
    let w = placement.drawn_width;
    let h = placement.drawn_height;
    format!(
        "q\n{}{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
        pivot_commands(placement),
        num(w),
        num(h),
        num(-w / 2.0),
        num(-h / 2.0),
        xobject_name
    )
}

/// Content stream that draws a Form XObject whose BBox starts at `origin`.
pub fn form_placement_command(
    xobject_name: &str,
    placement: &ImagePlacement,
    origin: (f32, f32),
) -> String {
    let s = placement.scale;
    let tx = -placement.drawn_width / 2.0 - origin.0 * s;
    let ty = -placement.drawn_height / 2.0 - origin.1 * s;
    format!(
        "q\n{}{} 0 0 {} {} {} cm\n/{} Do\nQ\n",
        pivot_commands(placement),
        num(s),
        num(s),
        num(tx),
        num(ty),
        xobject_name
    )
}

/// Translate to the pivot and rotate clockwise about it
fn pivot_commands(placement: &ImagePlacement) -> String {
    let (cx, cy) = placement.center;
    let mut ops = format!("1 0 0 1 {} {} cm\n", num(cx), num(cy));
    if placement.rotation_degrees != 0 {
        let [a, b, c, d] = clockwise_matrix(placement.rotation_degrees);
        ops.push_str(&format!(
            "{} {} {} {} 0 0 cm\n",
            num(a),
            num(b),
            num(c),
            num(d)
        ));
    }
    ops
}

/// `[a b c d]` of a clockwise rotation in PDF's y-up space
pub fn clockwise_matrix(degrees: u16) -> [f32; 4] {
    match degrees % 360 {
        0 => [1.0, 0.0, 0.0, 1.0],
        90 => [0.0, -1.0, 1.0, 0.0],
        180 => [-1.0, 0.0, 0.0, -1.0],
        270 => [0.0, 1.0, -1.0, 0.0],
        other => {
            let rad = f32::from(other).to_radians();
            let (sin, cos) = rad.sin_cos();
            [cos, -sin, sin, cos]
        }
    }
}

/// Format a number for a content stream
fn num(value: f32) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

// =============================================================================
// Page Objects
// =============================================================================

/// Add a canvas-sized page holding `content` to `output`.
pub fn add_page_object(
    output: &mut Document,
    parent_pages_id: ObjectId,
    canvas: &Canvas,
    content: String,
    xobjects: Dictionary,
) -> ObjectId {
    let mut page_dict = Dictionary::new();
    page_dict.set("Type", Object::Name(b"Page".to_vec()));
    page_dict.set("Parent", Object::Reference(parent_pages_id));
    page_dict.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(canvas.width_pt),
            Object::Real(canvas.height_pt),
        ]),
    );

    let mut resources = Dictionary::new();
    resources.set("XObject", Object::Dictionary(xobjects));

    let content_id = output.add_object(Stream::new(Dictionary::new(), content.into_bytes()));

    page_dict.set("Contents", Object::Reference(content_id));
    page_dict.set("Resources", Object::Dictionary(resources));

    output.add_object(page_dict)
}
