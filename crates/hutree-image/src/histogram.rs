//! 256-bin intensity histograms and histogram equalization.

use tracing::debug;

use crate::image::GrayscaleImage;

/// Number of intensity bins.
pub const N_BINS: usize = 256;

/// 256-bin histogram of 8-bit intensities.
///
/// `total()` always equals the pixel count of the source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u64; N_BINS],
    total: u64,
}

impl Histogram {
    /// Count intensities of `image`.
    #[must_use]
    pub fn from_image(image: &GrayscaleImage) -> Self {
        let mut bins = [0u64; N_BINS];
        for &v in image.as_slice() {
            bins[usize::from(v)] += 1;
        }
        let total = bins.iter().sum();
        Self { bins, total }
    }

    /// Return the total number of counted pixels.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Return the count for intensity `value`.
    #[must_use]
    pub fn count(&self, value: u8) -> u64 {
        self.bins[usize::from(value)]
    }

    /// Borrow all 256 bins.
    #[must_use]
    pub fn bins(&self) -> &[u64; N_BINS] {
        &self.bins
    }

    /// Cumulative counts: `cdf[i] = Σ bins[0..=i]`.
    #[must_use]
    pub fn cdf(&self) -> [u64; N_BINS] {
        let mut cdf = [0u64; N_BINS];
        let mut running = 0u64;
        for (slot, &count) in cdf.iter_mut().zip(&self.bins) {
            running += count;
            *slot = running;
        }
        cdf
    }

    /// Cumulative distribution as fractions of the total. All zeros for an empty histogram.
    #[must_use]
    pub fn normalized_cdf(&self) -> [f64; N_BINS] {
        let mut out = [0.0f64; N_BINS];
        if self.total == 0 {
            return out;
        }
        let total = self.total as f64;
        for (slot, c) in out.iter_mut().zip(self.cdf()) {
            *slot = c as f64 / total;
        }
        out
    }

    /// First nonzero cumulative count, or 0 for an empty histogram.
    #[must_use]
    pub fn cdf_min(&self) -> u64 {
        self.cdf().into_iter().find(|&c| c > 0).unwrap_or(0)
    }
}

/// Compute the 256-bin histogram of `image`.
#[must_use]
pub fn histogram_256(image: &GrayscaleImage) -> Histogram {
    Histogram::from_image(image)
}

/// Histogram-equalize `image`.
///
/// Each intensity `v` maps to `round((C[v] - cdf_min) / (total - cdf_min) * 255)`
/// clamped to `[0, 255]`, where `C` is the cumulative histogram and `cdf_min`
/// its first nonzero value. Rounding is half-to-even.
///
/// Images with at most one pixel, or whose pixels all share one intensity,
/// come back unchanged.
#[must_use]
pub fn equalize(image: &GrayscaleImage) -> GrayscaleImage {
    let hist = Histogram::from_image(image);
    let total = hist.total();
    let cdf = hist.cdf();
    let cdf_min = hist.cdf_min();

    if total <= 1 || cdf_min == total {
        debug!(total, cdf_min, "degenerate histogram, equalization skipped");
        return image.clone();
    }

    let denom = (total - cdf_min) as f64;
    let mut lut = [0u8; N_BINS];
    for (v, slot) in lut.iter_mut().enumerate() {
        // Intensities below the first occupied bin never occur, so the
        // saturating subtraction only affects unused table entries.
        let numer = cdf[v].saturating_sub(cdf_min) as f64;
        *slot = (numer / denom * 255.0).round_ties_even().clamp(0.0, 255.0) as u8;
    }
    image.map(|v| lut[usize::from(v)])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> GrayscaleImage {
        GrayscaleImage::from_fn(width, height, |row, col| ((row * width + col) % 256) as u8)
    }

    #[test]
    fn histogram_sums_to_pixel_count() {
        let img = GrayscaleImage::from_rows(&[vec![0, 0, 5], vec![255, 5, 5]]).unwrap();
        let h = histogram_256(&img);
        assert_eq!(h.total(), 6);
        assert_eq!(h.count(0), 2);
        assert_eq!(h.count(5), 3);
        assert_eq!(h.count(255), 1);
        assert_eq!(h.bins().iter().sum::<u64>(), 6);
    }

    #[test]
    fn cdf_is_cumulative() {
        let img = GrayscaleImage::from_rows(&[vec![1, 1, 3]]).unwrap();
        let h = histogram_256(&img);
        let cdf = h.cdf();
        assert_eq!(cdf[0], 0);
        assert_eq!(cdf[1], 2);
        assert_eq!(cdf[2], 2);
        assert_eq!(cdf[3], 3);
        assert_eq!(cdf[255], 3);
        assert_eq!(h.cdf_min(), 2);
        assert!((h.normalized_cdf()[255] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_image_unchanged() {
        let img = GrayscaleImage::from_fn(16, 16, |_, _| 128);
        assert_eq!(equalize(&img), img);
    }

    #[test]
    fn single_pixel_unchanged() {
        let img = GrayscaleImage::from_rows(&[vec![77]]).unwrap();
        assert_eq!(equalize(&img), img);
    }

    #[test]
    fn two_level_image_stretches_to_full_range() {
        let img = GrayscaleImage::from_rows(&[vec![100, 100, 110, 110]]).unwrap();
        let eq = equalize(&img);
        assert_eq!(eq.as_slice(), &[0, 0, 255, 255]);
    }

    #[test]
    fn flat_histogram_maps_to_itself() {
        // Every intensity appears exactly once: C[v] = v + 1, cdf_min = 1,
        // so v -> round(v / 255 * 255) = v.
        let img = ramp(256, 1);
        assert_eq!(equalize(&img), img);
    }

    #[test]
    fn equalize_is_idempotent_on_equalized_output() {
        let img = ramp(64, 8);
        let once = equalize(&img);
        let twice = equalize(&once);
        assert_eq!(histogram_256(&once), histogram_256(&twice));
    }

    #[test]
    fn output_is_monotone_in_input() {
        let img = GrayscaleImage::from_rows(&[vec![10, 20, 20, 30, 200, 201]]).unwrap();
        let eq = equalize(&img);
        let s = eq.as_slice();
        assert!(s.windows(2).all(|w| w[0] <= w[1]), "{s:?}");
        assert_eq!(s[0], 0);
        assert_eq!(s[5], 255);
    }
}
