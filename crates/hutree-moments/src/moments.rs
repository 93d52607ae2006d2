//! Geometric moments of binary masks.
//!
//! Coordinates follow the raster: `x` is the column index and `y` the row
//! index of a foreground pixel.

use hutree_image::BinaryMask;

/// Highest moment order kept by [`MomentSet`].
pub const MAX_ORDER: usize = 3;

/// `[1, d, d^2, d^3]`.
fn powers(d: f64) -> [f64; MAX_ORDER + 1] {
    [1.0, d, d.powi(2), d.powi(3)]
}

/// Raw moment `M(p, q) = Σ x^p · y^q` over foreground pixels.
#[must_use]
pub fn raw_moment(mask: &BinaryMask, p: u32, q: u32) -> f64 {
    mask.foreground()
        .map(|(x, y)| (x as f64).powi(p as i32) * (y as f64).powi(q as i32))
        .sum()
}

/// Central moment `μ(p, q) = Σ (x - xc)^p · (y - yc)^q` over foreground pixels.
#[must_use]
pub fn central_moment(mask: &BinaryMask, p: u32, q: u32, xc: f64, yc: f64) -> f64 {
    mask.foreground()
        .map(|(x, y)| (x as f64 - xc).powi(p as i32) * (y as f64 - yc).powi(q as i32))
        .sum()
}

/// Normalized central moment `η(p, q) = μ(p, q) / μ00^(1 + (p + q) / 2)`.
///
/// Returns 0.0 when `mu00` is zero.
#[must_use]
pub fn normalized_central_moment(
    mask: &BinaryMask,
    p: u32,
    q: u32,
    mu00: f64,
    xc: f64,
    yc: f64,
) -> f64 {
    if mu00 == 0.0 {
        return 0.0;
    }
    central_moment(mask, p, q, xc, yc) / mu00.powf(gamma(p as usize, q as usize))
}

fn gamma(p: usize, q: usize) -> f64 {
    1.0 + (p + q) as f64 / 2.0
}

/// All raw and central moments with `p + q <= 3`, computed in two passes.
///
/// Equivalent to calling [`raw_moment`] and [`central_moment`] for each
/// `(p, q)` pair, without rescanning the mask per pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentSet {
    raw: [[f64; MAX_ORDER + 1]; MAX_ORDER + 1],
    central: [[f64; MAX_ORDER + 1]; MAX_ORDER + 1],
    centroid: (f64, f64),
}

impl MomentSet {
    /// Compute the moment set of `mask`.
    ///
    /// An empty mask yields all-zero moments and a `(0.0, 0.0)` centroid.
    #[must_use]
    pub fn from_mask(mask: &BinaryMask) -> Self {
        let mut raw = [[0.0f64; MAX_ORDER + 1]; MAX_ORDER + 1];
        for (x, y) in mask.foreground() {
            let xp = powers(x as f64);
            let yq = powers(y as f64);
            for p in 0..=MAX_ORDER {
                for q in 0..=(MAX_ORDER - p) {
                    raw[p][q] += xp[p] * yq[q];
                }
            }
        }

        let m00 = raw[0][0];
        let centroid = if m00 == 0.0 {
            (0.0, 0.0)
        } else {
            (raw[1][0] / m00, raw[0][1] / m00)
        };

        let mut central = [[0.0f64; MAX_ORDER + 1]; MAX_ORDER + 1];
        if m00 != 0.0 {
            let (xc, yc) = centroid;
            for (x, y) in mask.foreground() {
                let xp = powers(x as f64 - xc);
                let yq = powers(y as f64 - yc);
                for p in 0..=MAX_ORDER {
                    for q in 0..=(MAX_ORDER - p) {
                        central[p][q] += xp[p] * yq[q];
                    }
                }
            }
        }

        Self {
            raw,
            central,
            centroid,
        }
    }

    /// Raw moment `M(p, q)`.
    ///
    /// # Panics
    ///
    /// Panics if `p + q > 3`.
    #[must_use]
    pub fn raw(&self, p: usize, q: usize) -> f64 {
        assert!(p + q <= MAX_ORDER, "moment order {} exceeds {MAX_ORDER}", p + q);
        self.raw[p][q]
    }

    /// Central moment `μ(p, q)`.
    ///
    /// # Panics
    ///
    /// Panics if `p + q > 3`.
    #[must_use]
    pub fn central(&self, p: usize, q: usize) -> f64 {
        assert!(p + q <= MAX_ORDER, "moment order {} exceeds {MAX_ORDER}", p + q);
        self.central[p][q]
    }

    /// Normalized central moment `η(p, q)`; 0.0 for an empty mask.
    ///
    /// # Panics
    ///
    /// Panics if `p + q > 3`.
    #[must_use]
    pub fn normalized(&self, p: usize, q: usize) -> f64 {
        let mu00 = self.central(0, 0);
        if mu00 == 0.0 {
            return 0.0;
        }
        self.central(p, q) / mu00.powf(gamma(p, q))
    }

    /// Zeroth moment (foreground pixel count as a float).
    #[must_use]
    pub fn m00(&self) -> f64 {
        self.raw[0][0]
    }

    /// Centroid `(M10 / M00, M01 / M00)`, or `(0.0, 0.0)` for an empty mask.
    #[must_use]
    pub fn centroid(&self) -> (f64, f64) {
        self.centroid
    }

    /// Return true if the mask had no foreground pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw[0][0] == 0.0
    }
}
