//! Raster types with validated dimensions.

use crate::error::ImageError;

/// Row-major 8-bit grayscale raster.
///
/// Guaranteed rectangular: `pixels.len() == width * height`. Intensities are
/// `u8`, so every value is already in `[0, 255]`; constructors that accept
/// wider integers clamp on the way in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl GrayscaleImage {
    /// Create an image from a row-major pixel buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::DimensionMismatch`] if `pixels.len() != width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(ImageError::DimensionMismatch {
                width,
                height,
                expected,
                got: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Create an image from nested rows, clamping each value to `[0, 255]`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ImageError::EmptyImage`] | no rows, or the first row is empty |
    /// | [`ImageError::RaggedRows`] | a row differs in length from the first |
    pub fn from_rows(rows: &[Vec<i32>]) -> Result<Self, ImageError> {
        let (width, height) = checked_dims(rows)?;
        let pixels = rows
            .iter()
            .flat_map(|row| row.iter().map(|&v| v.clamp(0, 255) as u8))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build an image by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                pixels.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Convert an RGB buffer to luminance: `round(0.299 R + 0.587 G + 0.114 B)`.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::DimensionMismatch`] if `rgb.len() != width * height`.
    pub fn from_rgb(width: usize, height: usize, rgb: &[[u8; 3]]) -> Result<Self, ImageError> {
        let expected = width * height;
        if rgb.len() != expected {
            return Err(ImageError::DimensionMismatch {
                width,
                height,
                expected,
                got: rgb.len(),
            });
        }
        let pixels = rgb
            .iter()
            .map(|&[r, g, b]| {
                let y = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
                y.round_ties_even().clamp(0.0, 255.0) as u8
            })
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Return the width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return the height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return the total number of pixels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Return true if the image has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Return the intensity at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the image.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> u8 {
        assert!(row < self.height && col < self.width, "pixel ({row}, {col}) out of bounds");
        self.pixels[row * self.width + col]
    }

    /// Borrow the row-major pixel buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.pixels
    }

    /// Apply `f` to every intensity, keeping dimensions.
    #[must_use]
    pub fn map(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|&v| f(v)).collect(),
        }
    }
}

/// Row-major binary foreground mask.
///
/// Pixel `(row, col)` maps to moment coordinates `x = col`, `y = row`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryMask {
    width: usize,
    height: usize,
    bits: Vec<bool>,
}

impl BinaryMask {
    /// Create a mask from a row-major buffer.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::DimensionMismatch`] if `bits.len() != width * height`.
    pub fn new(width: usize, height: usize, bits: Vec<bool>) -> Result<Self, ImageError> {
        let expected = width * height;
        if bits.len() != expected {
            return Err(ImageError::DimensionMismatch {
                width,
                height,
                expected,
                got: bits.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Create an all-background mask.
    #[must_use]
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Create a mask from nested rows; any nonzero value is foreground.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ImageError::EmptyImage`] | no rows, or the first row is empty |
    /// | [`ImageError::RaggedRows`] | a row differs in length from the first |
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, ImageError> {
        let (width, height) = checked_dims(rows)?;
        let bits = rows
            .iter()
            .flat_map(|row| row.iter().map(|&v| v != 0))
            .collect();
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Build a mask by evaluating `f(row, col)` for every pixel.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut bits = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                bits.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            bits,
        }
    }

    /// Return the width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Return the height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Return whether `(row, col)` is foreground.
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the mask.
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> bool {
        assert!(row < self.height && col < self.width, "pixel ({row}, {col}) out of bounds");
        self.bits[row * self.width + col]
    }

    /// Set `(row, col)` to `value`.
    ///
    /// # Panics
    ///
    /// Panics if the position lies outside the mask.
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        assert!(row < self.height && col < self.width, "pixel ({row}, {col}) out of bounds");
        self.bits[row * self.width + col] = value;
    }

    /// Iterate over foreground pixels as `(x, y)` = `(col, row)`, row-major.
    pub fn foreground(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.bits
            .iter()
            .enumerate()
            .filter(|&(_, &on)| on)
            .map(move |(i, _)| (i % width, i / width))
    }

    /// Return the number of foreground pixels.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&on| on).count()
    }

    /// Swap foreground and background.
    #[must_use]
    pub fn inverted(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            bits: self.bits.iter().map(|&on| !on).collect(),
        }
    }

    /// Move every foreground pixel by `(d_row, d_col)`, dropping pixels that leave the canvas.
    #[must_use]
    pub fn shifted(&self, d_row: isize, d_col: isize) -> Self {
        let mut out = Self::empty(self.width, self.height);
        for (x, y) in self.foreground() {
            let row = y as isize + d_row;
            let col = x as isize + d_col;
            if row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
            {
                out.set(row as usize, col as usize, true);
            }
        }
        out
    }

    /// Rotate clockwise by `quarter_turns * 90` degrees. Width and height swap on odd turns.
    #[must_use]
    pub fn rotated(&self, quarter_turns: u32) -> Self {
        let (w, h) = (self.width, self.height);
        match quarter_turns % 4 {
            0 => self.clone(),
            1 => Self::from_fn(h, w, |row, col| self.get(h - 1 - col, row)),
            2 => Self::from_fn(w, h, |row, col| self.get(h - 1 - row, w - 1 - col)),
            _ => Self::from_fn(h, w, |row, col| self.get(col, w - 1 - row)),
        }
    }

    /// Export as nested rows of `0`/`1`.
    #[must_use]
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        self.bits
            .chunks(self.width.max(1))
            .map(|row| row.iter().map(|&on| u8::from(on)).collect())
            .collect()
    }
}

/// Validate nested rows and return `(width, height)`.
fn checked_dims<T>(rows: &[Vec<T>]) -> Result<(usize, usize), ImageError> {
    let Some(first) = rows.first() else {
        return Err(ImageError::EmptyImage);
    };
    let width = first.len();
    if width == 0 {
        return Err(ImageError::EmptyImage);
    }
    if let Some((row_index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
        return Err(ImageError::RaggedRows {
            row_index,
            expected: width,
            got: row.len(),
        });
    }
    Ok((width, rows.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_wrong_buffer_length() {
        let err = GrayscaleImage::new(3, 2, vec![0; 5]).unwrap_err();
        assert!(matches!(
            err,
            ImageError::DimensionMismatch { expected: 6, got: 5, .. }
        ));
    }

    #[test]
    fn from_rows_clamps_values() {
        let img = GrayscaleImage::from_rows(&[vec![-10, 300], vec![128, 255]]).unwrap();
        assert_eq!(img.as_slice(), &[0, 255, 128, 255]);
        assert_eq!((img.width(), img.height()), (2, 2));
    }

    #[test]
    fn from_rows_rejects_ragged() {
        let err = GrayscaleImage::from_rows(&[vec![1, 2, 3], vec![4, 5]]).unwrap_err();
        assert!(matches!(
            err,
            ImageError::RaggedRows { row_index: 1, expected: 3, got: 2 }
        ));
    }

    #[test]
    fn from_rows_rejects_empty() {
        assert!(matches!(
            GrayscaleImage::from_rows(&[]),
            Err(ImageError::EmptyImage)
        ));
        assert!(matches!(
            BinaryMask::from_rows(&[vec![]]),
            Err(ImageError::EmptyImage)
        ));
    }

    #[test]
    fn rgb_luminance() {
        let img = GrayscaleImage::from_rgb(3, 1, &[[255, 0, 0], [0, 255, 0], [255, 255, 255]])
            .unwrap();
        // 0.299 * 255 = 76.245, 0.587 * 255 = 149.685
        assert_eq!(img.as_slice(), &[76, 150, 255]);
    }

    #[test]
    fn mask_foreground_coordinates_are_col_row() {
        let mask = BinaryMask::from_rows(&[vec![0, 0, 0], vec![0, 0, 1]]).unwrap();
        let fg: Vec<(usize, usize)> = mask.foreground().collect();
        assert_eq!(fg, vec![(2, 1)]);
        assert_eq!(mask.count(), 1);
    }

    #[test]
    fn inverted_swaps_counts() {
        let mask = BinaryMask::from_rows(&[vec![1, 0], vec![0, 0]]).unwrap();
        assert_eq!(mask.inverted().count(), 3);
    }

    #[test]
    fn shifted_drops_pixels_outside() {
        let mask = BinaryMask::from_rows(&[vec![1, 0], vec![0, 1]]).unwrap();
        let moved = mask.shifted(1, 0);
        assert_eq!(moved.to_rows(), vec![vec![0, 0], vec![1, 0]]);
    }

    #[test]
    fn rotation_quarter_turn() {
        // 2 rows x 3 cols
        let mask = BinaryMask::from_rows(&[vec![1, 1, 1], vec![1, 0, 0]]).unwrap();
        let r = mask.rotated(1);
        assert_eq!((r.width(), r.height()), (2, 3));
        assert_eq!(r.to_rows(), vec![vec![1, 1], vec![0, 1], vec![0, 1]]);
        assert_eq!(mask.rotated(4), mask);
        assert_eq!(mask.rotated(1).rotated(3), mask);
        assert_eq!(mask.rotated(2).count(), mask.count());
    }
}
