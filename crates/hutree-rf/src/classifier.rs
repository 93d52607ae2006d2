//! Common fit/predict interface shared by trees and forests.

use rand::Rng;

use crate::error::RfError;
use crate::forest::{RandomForest, RandomForestConfig};
use crate::label::ClassLabels;
use crate::tree::{DecisionTree, DecisionTreeConfig};

/// A fitted model that labels feature rows.
pub trait Classifier {
    /// Sorted class labels the model was trained on.
    fn classes(&self) -> &ClassLabels;

    /// Predict one label per row.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any row has the wrong width.
    fn predict_labels(&self, features: &[Vec<f64>]) -> Result<Vec<String>, RfError>;

    /// Per-row class probabilities ordered by [`Classifier::classes`].
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any row has the wrong width.
    fn predict_probabilities(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, RfError>;

    /// Normalized MDI importances, one per feature column.
    fn feature_importances(&self) -> Vec<f64>;
}

/// A model configuration that can train a fresh [`Classifier`].
pub trait Estimator {
    /// The fitted model type.
    type Model: Classifier;

    /// Train a new model, drawing any randomness from `rng`.
    ///
    /// # Errors
    ///
    /// Returns the training errors of the underlying model.
    fn fit_with_rng<S: AsRef<str>, R: Rng>(
        &self,
        features: &[Vec<f64>],
        labels: &[S],
        rng: &mut R,
    ) -> Result<Self::Model, RfError>;
}

impl Classifier for DecisionTree {
    fn classes(&self) -> &ClassLabels {
        DecisionTree::classes(self)
    }

    fn predict_labels(&self, features: &[Vec<f64>]) -> Result<Vec<String>, RfError> {
        self.predict_batch(features)
    }

    fn predict_probabilities(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, RfError> {
        self.predict_proba_batch(features)
    }

    fn feature_importances(&self) -> Vec<f64> {
        DecisionTree::feature_importances(self)
    }
}

impl Classifier for RandomForest {
    fn classes(&self) -> &ClassLabels {
        RandomForest::classes(self)
    }

    fn predict_labels(&self, features: &[Vec<f64>]) -> Result<Vec<String>, RfError> {
        self.predict_batch(features)
    }

    fn predict_probabilities(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, RfError> {
        Ok(self
            .predict_proba_batch(features)?
            .into_iter()
            .map(|d| d.into_vec())
            .collect())
    }

    fn feature_importances(&self) -> Vec<f64> {
        RandomForest::feature_importances(self)
    }
}

impl Estimator for DecisionTreeConfig {
    type Model = DecisionTree;

    /// Trees are deterministic; `rng` is left untouched.
    fn fit_with_rng<S: AsRef<str>, R: Rng>(
        &self,
        features: &[Vec<f64>],
        labels: &[S],
        _rng: &mut R,
    ) -> Result<DecisionTree, RfError> {
        self.fit(features, labels)
    }
}

impl Estimator for RandomForestConfig {
    type Model = RandomForest;

    fn fit_with_rng<S: AsRef<str>, R: Rng>(
        &self,
        features: &[Vec<f64>],
        labels: &[S],
        rng: &mut R,
    ) -> Result<RandomForest, RfError> {
        RandomForestConfig::fit_with_rng(self, features, labels, rng)
    }
}
