//! Grayscale scenes painted from shape masks.

use hutree_image::{BinaryMask, GrayscaleImage};
use hutree_moments::ShapeKind;

/// Paint `mask` as a grayscale image: foreground pixels get `foreground`,
/// the rest `background`.
#[must_use]
pub fn render_mask(mask: &BinaryMask, foreground: u8, background: u8) -> GrayscaleImage {
    GrayscaleImage::from_fn(mask.width(), mask.height(), |row, col| {
        if mask.get(row, col) {
            foreground
        } else {
            background
        }
    })
}

/// Render the canonical `shape` on a `size x size` canvas.
///
/// The shape geometry is [`ShapeKind::canonical_mask`].
#[must_use]
pub fn render_scene(shape: ShapeKind, size: usize, foreground: u8, background: u8) -> GrayscaleImage {
    render_mask(&shape.canonical_mask(size), foreground, background)
}
