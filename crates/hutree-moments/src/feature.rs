//! Log-magnitude Hu features.

use hutree_image::BinaryMask;

use crate::hu::{HuVector, hu_moments};

/// Number of features per sample.
pub const N_FEATURES: usize = 7;

/// Column names, in feature order.
pub const FEATURE_NAMES: [&str; N_FEATURES] = ["hu1", "hu2", "hu3", "hu4", "hu5", "hu6", "hu7"];

/// Magnitudes below this map to 0.0 instead of a huge (or infinite) log.
const MAGNITUDE_FLOOR: f64 = 1e-30;

/// Owned copies of [`FEATURE_NAMES`].
#[must_use]
pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect()
}

/// `-log10(|φi|)` for each Hu invariant, with `|φi| < 1e-30` mapped to 0.0.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct FeatureVector([f64; N_FEATURES]);

impl FeatureVector {
    /// Apply the log-magnitude transform to `hu`.
    #[must_use]
    pub fn from_hu(hu: &HuVector) -> Self {
        Self(hu.as_array().map(|v| {
            let magnitude = v.abs();
            if magnitude < MAGNITUDE_FLOOR {
                0.0
            } else {
                -magnitude.log10()
            }
        }))
    }

    /// Wrap precomputed feature values.
    #[must_use]
    pub fn new(values: [f64; N_FEATURES]) -> Self {
        Self(values)
    }

    /// Borrow the features as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Copy into a `Vec`, the row layout used by the classifiers.
    #[must_use]
    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.0
            .iter()
            .zip(&other.0)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Return true if every feature is finite.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }
}

/// Compute the log-Hu feature vector of `mask`.
#[must_use]
pub fn extract_features(mask: &BinaryMask) -> FeatureVector {
    FeatureVector::from_hu(&hu_moments(mask))
}
