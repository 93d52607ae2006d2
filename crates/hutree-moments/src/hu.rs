//! The seven Hu moment invariants.

use std::ops::Index;

use hutree_image::BinaryMask;

use crate::moments::MomentSet;

/// Hu invariants `φ1..φ7`, stored zero-based.
///
/// Invariant under translation, scale and in-plane rotation of the shape.
/// An all-zero vector means the mask had no foreground.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct HuVector([f64; 7]);

impl HuVector {
    /// Wrap seven precomputed invariants.
    #[must_use]
    pub fn new(values: [f64; 7]) -> Self {
        Self(values)
    }

    /// The all-zero vector returned for empty masks.
    #[must_use]
    pub fn zero() -> Self {
        Self([0.0; 7])
    }

    /// Compute the invariants from a [`MomentSet`].
    #[must_use]
    pub fn from_moments(moments: &MomentSet) -> Self {
        if moments.is_empty() {
            return Self::zero();
        }
        hu_from_normalized(
            moments.normalized(2, 0),
            moments.normalized(0, 2),
            moments.normalized(1, 1),
            moments.normalized(3, 0),
            moments.normalized(1, 2),
            moments.normalized(2, 1),
            moments.normalized(0, 3),
        )
    }

    /// Borrow the values as an array.
    #[must_use]
    pub fn as_array(&self) -> &[f64; 7] {
        &self.0
    }

    /// Return true if every invariant is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&v| v == 0.0)
    }
}

impl Index<usize> for HuVector {
    type Output = f64;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

/// Compute the Hu invariants of `mask`. All zeros for an empty mask.
#[must_use]
pub fn hu_moments(mask: &BinaryMask) -> HuVector {
    HuVector::from_moments(&MomentSet::from_mask(mask))
}

/// Combine normalized central moments into `φ1..φ7`.
///
/// The φ5-φ7 cross terms keep the exact grouping of the classical
/// definitions; the shape templates are calibrated against this evaluation
/// order.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn hu_from_normalized(
    eta20: f64,
    eta02: f64,
    eta11: f64,
    eta30: f64,
    eta12: f64,
    eta21: f64,
    eta03: f64,
) -> HuVector {
    let phi1 = eta20 + eta02;
    let phi2 = (eta20 - eta02).powi(2) + 4.0 * eta11.powi(2);
    let phi3 = (eta30 - 3.0 * eta12).powi(2) + (3.0 * eta21 - eta03).powi(2);
    let phi4 = (eta30 + eta12).powi(2) + (eta21 + eta03).powi(2);
    let phi5 = (eta30 - 3.0 * eta12)
        * (eta30 + eta12)
        * ((eta30 + eta12).powi(2) - 3.0 * (eta21 + eta03).powi(2))
        + (3.0 * eta21 - eta03)
            * (eta21 + eta03)
            * (3.0 * (eta30 + eta12).powi(2) - (eta21 + eta03).powi(2));
    let phi6 = (eta20 - eta02) * ((eta30 + eta12).powi(2) - (eta21 + eta03).powi(2))
        + 4.0 * eta11 * (eta30 + eta12) * (eta21 + eta03);
    let phi7 = (3.0 * eta21 - eta03)
        * (eta30 + eta12)
        * ((eta30 + eta12).powi(2) - 3.0 * (eta21 + eta03).powi(2))
        - (eta30 - 3.0 * eta12)
            * (eta21 + eta03)
            * (3.0 * (eta30 + eta12).powi(2) - (eta21 + eta03).powi(2));
    HuVector([phi1, phi2, phi3, phi4, phi5, phi6, phi7])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{circle_mask, rectangle_mask, square_mask};

    /// Irregular shape with no mirror or rotational symmetry.
    fn irregular(n: usize, offset: usize) -> BinaryMask {
        BinaryMask::from_fn(n, n, |r, c| {
            let (r, c) = (r as isize - offset as isize, c as isize - offset as isize);
            let bar = (0..6).contains(&r) && (0..30).contains(&c);
            let post = (0..22).contains(&r) && (0..7).contains(&c);
            let wedge = (10..22).contains(&r) && (14..40).contains(&c) && c - 14 <= (r - 10) * 2;
            bar || post || wedge
        })
    }

    fn assert_close(a: &HuVector, b: &HuVector) {
        for i in 0..7 {
            let tol = 1e-7 * a[i].abs().max(b[i].abs()) + 1e-15;
            assert!((a[i] - b[i]).abs() <= tol, "phi{}: {} vs {}", i + 1, a[i], b[i]);
        }
    }

    #[test]
    fn empty_mask_gives_zero_vector() {
        let hu = hu_moments(&BinaryMask::empty(10, 10));
        assert!(hu.is_zero());
    }

    #[test]
    fn translation_invariance() {
        let a = hu_moments(&irregular(80, 5));
        let b = hu_moments(&irregular(80, 31));
        assert_close(&a, &b);
    }

    #[test]
    fn quarter_turn_invariance() {
        let mask = irregular(64, 8);
        let base = hu_moments(&mask);
        for turns in 1..4 {
            assert_close(&base, &hu_moments(&mask.rotated(turns)));
        }
    }

    #[test]
    fn square_phi2_is_smaller_than_rectangle() {
        let square = hu_moments(&square_mask(200, 120));
        // 2:1 rectangle of comparable area (170 x 85 = 14450 vs 14400)
        let rect = hu_moments(&rectangle_mask(200, 170, 85));
        assert!(square[1].abs() < rect[1].abs());
        assert!(square[1].abs() < 1e-12);
    }

    #[test]
    fn circle_phi1_near_continuous_value() {
        // Continuous disc: phi1 = 1 / (2 pi)
        let hu = hu_moments(&circle_mask(200, 70));
        assert!((hu[0] - 1.0 / (2.0 * std::f64::consts::PI)).abs() < 1e-3);
        assert!(hu[1] < 1e-6);
    }

    #[test]
    fn formula_on_known_normalized_moments() {
        // Only second-order terms: phi3..phi7 vanish.
        let hu = hu_from_normalized(0.2, 0.1, 0.05, 0.0, 0.0, 0.0, 0.0);
        assert!((hu[0] - 0.3).abs() < 1e-15);
        assert!((hu[1] - (0.01 + 4.0 * 0.0025)).abs() < 1e-15);
        assert!(hu.as_array()[2..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn third_order_terms() {
        let (e30, e12, e21, e03) = (0.01, 0.02, -0.03, 0.005);
        let hu = hu_from_normalized(0.0, 0.0, 0.0, e30, e12, e21, e03);
        let a = e30 - 3.0 * e12;
        let b = 3.0 * e21 - e03;
        let s = e30 + e12;
        let t = e21 + e03;
        assert!((hu[2] - (a * a + b * b)).abs() < 1e-15);
        assert!((hu[3] - (s * s + t * t)).abs() < 1e-15);
        let phi5 = a * s * (s * s - 3.0 * t * t) + b * t * (3.0 * s * s - t * t);
        let phi7 = b * s * (s * s - 3.0 * t * t) - a * t * (3.0 * s * s - t * t);
        assert!((hu[4] - phi5).abs() < 1e-15);
        assert_eq!(hu[5], 0.0);
        assert!((hu[6] - phi7).abs() < 1e-15);
    }
}
