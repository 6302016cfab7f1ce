//! Frame conversion utilities.

use std::time::Instant;

use super::types::{ColorSpace, Frame};

/// Expand tightly packed RGB pixels to RGBA with an opaque alpha channel.
pub fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);
    for px in rgb.chunks_exact(3) {
        rgba.extend_from_slice(&[px[0], px[1], px[2], 0xff]);
    }
    rgba
}

/// Build an sRGB frame from decoded RGB pixels.
///
/// Returns `None` if the buffer does not match the given dimensions.
pub fn frame_from_rgb(rgb: &[u8], width: u32, height: u32) -> Option<Frame> {
    let expected = width as usize * height as usize * 3;
    if rgb.len() != expected {
        return None;
    }

    Some(Frame {
        data: rgb_to_rgba(rgb),
        width,
        height,
        color_space: ColorSpace::Srgb,
        sequence: 0,
        timestamp: Instant::now(),
    })
}
