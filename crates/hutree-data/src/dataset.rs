//! Feature rows with string labels.

use std::collections::BTreeMap;

use hutree_moments::{FeatureVector, feature_names};
use hutree_rf::{CrossValidation, CrossValidationResult, Estimator};
use rand::Rng;
use tracing::warn;

use crate::DataError;

/// One feature vector and its class label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSample {
    /// Log-Hu features of the sample.
    pub features: FeatureVector,
    /// Class label.
    pub label: String,
}

impl LabeledSample {
    /// Pair `features` with `label`.
    pub fn new(features: FeatureVector, label: impl Into<String>) -> Self {
        Self {
            features,
            label: label.into(),
        }
    }
}

/// A labeled set of log-Hu feature rows.
///
/// Features and labels are stored in parallel vectors: `labels[i]` belongs
/// to `features[i]`. Every stored value is finite.
#[derive(Debug, Clone)]
pub struct Dataset {
    feature_names: Vec<String>,
    features: Vec<Vec<f64>>,
    labels: Vec<String>,
}

impl Dataset {
    /// Create an empty dataset with the `hu1`..`hu7` column names.
    pub fn new() -> Self {
        Self {
            feature_names: feature_names(),
            features: Vec::new(),
            labels: Vec::new(),
        }
    }

    /// Append a sample.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::NonFiniteFeatures`] if any feature is NaN or infinite.
    pub fn push(&mut self, sample: LabeledSample) -> Result<(), DataError> {
        if !sample.features.is_finite() {
            return Err(DataError::NonFiniteFeatures {
                sample_index: self.len(),
                label: sample.label,
            });
        }
        self.features.push(sample.features.to_vec());
        self.labels.push(sample.label);
        Ok(())
    }

    /// Feature rows: `features()[sample_index][feature_index]`.
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    /// Labels, parallel to [`Dataset::features`].
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Column names, one per feature.
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Return true if the dataset holds no samples.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Sample count per label, in sorted label order.
    pub fn class_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for label in &self.labels {
            *counts.entry(label.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Train a model from `estimator` on every sample.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Model`] when training fails, e.g. on an empty dataset.
    pub fn fit<E: Estimator, R: Rng>(
        &self,
        estimator: &E,
        rng: &mut R,
    ) -> Result<E::Model, DataError> {
        Ok(estimator.fit_with_rng(&self.features, &self.labels, rng)?)
    }

    /// Cross-validate `estimator` on this dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Model`] when fold partitioning or training fails.
    pub fn cross_validate<E: Estimator>(
        &self,
        cv: &CrossValidation,
        estimator: &E,
    ) -> Result<CrossValidationResult, DataError> {
        Ok(cv.evaluate(estimator, &self.features, &self.labels)?)
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<LabeledSample> for Dataset {
    /// Appends every finite sample; non-finite ones are dropped with a warning.
    fn extend<T: IntoIterator<Item = LabeledSample>>(&mut self, iter: T) {
        for sample in iter {
            if let Err(err) = self.push(sample) {
                warn!(%err, "sample skipped");
            }
        }
    }
}
