//! Fixed-threshold binarization.

use tracing::warn;

use crate::image::{BinaryMask, GrayscaleImage};

/// Binarize `image`: pixels strictly greater than `t` become foreground.
///
/// A pixel equal to `t` is background.
#[must_use]
pub fn threshold(image: &GrayscaleImage, t: u8) -> BinaryMask {
    BinaryMask::from_fn(image.width(), image.height(), |row, col| {
        image.get(row, col) > t
    })
}

/// Band-pass binarization: pixels with `t1 <= v <= t2` become foreground.
///
/// When `t1 >= t2` the bounds are adjusted to `t1 = clamp(t2 - 1, 0, 254)`
/// and `t2 = clamp(t1 + 1, 1, 255)` (computed from the inputs) before
/// thresholding.
#[must_use]
pub fn threshold_between(image: &GrayscaleImage, t1: u8, t2: u8) -> BinaryMask {
    let (lo, hi) = band_bounds(t1, t2);
    if (lo, hi) != (t1, t2) {
        warn!(t1, t2, lo, hi, "band thresholds adjusted to enforce t1 < t2");
    }
    BinaryMask::from_fn(image.width(), image.height(), |row, col| {
        let v = image.get(row, col);
        lo <= v && v <= hi
    })
}

fn band_bounds(t1: u8, t2: u8) -> (u8, u8) {
    if t1 < t2 {
        return (t1, t2);
    }
    let lo = (i32::from(t2) - 1).clamp(0, 254) as u8;
    let hi = (i32::from(t1) + 1).clamp(1, 255) as u8;
    (lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> GrayscaleImage {
        GrayscaleImage::from_fn(16, 16, |row, col| (row * 16 + col) as u8)
    }

    #[test]
    fn boundary_value_is_background() {
        let img = GrayscaleImage::from_rows(&[vec![127, 128, 129]]).unwrap();
        let mask = threshold(&img, 128);
        assert_eq!(mask.to_rows(), vec![vec![0, 0, 1]]);
    }

    #[test]
    fn mask_matches_source_dimensions() {
        let img = GrayscaleImage::from_fn(7, 3, |_, _| 200);
        let mask = threshold(&img, 10);
        assert_eq!((mask.width(), mask.height()), (7, 3));
        assert_eq!(mask.count(), 21);
    }

    #[test]
    fn area_non_increasing_in_threshold() {
        let img = gradient();
        let mut previous = usize::MAX;
        for t in 0..=255u8 {
            let area = threshold(&img, t).count();
            assert!(area <= previous, "t = {t}: {area} > {previous}");
            previous = area;
        }
        assert_eq!(threshold(&img, 255).count(), 0);
    }

    #[test]
    fn band_is_inclusive() {
        let img = GrayscaleImage::from_rows(&[vec![84, 85, 170, 171]]).unwrap();
        let mask = threshold_between(&img, 85, 170);
        assert_eq!(mask.to_rows(), vec![vec![0, 1, 1, 0]]);
    }

    #[test]
    fn reversed_band_is_adjusted() {
        assert_eq!(band_bounds(170, 85), (84, 171));
        assert_eq!(band_bounds(100, 100), (99, 101));
        assert_eq!(band_bounds(0, 0), (0, 1));
        assert_eq!(band_bounds(255, 255), (254, 255));
    }
}
