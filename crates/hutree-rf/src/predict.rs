//! Forest voting and per-class vote distributions.

use crate::error::RfError;
use crate::forest::RandomForest;
use crate::importance::{RankedFeature, aggregate_importances};
use crate::label::ClassLabels;
use crate::tree::DecisionTree;

/// Vote fractions from a forest prediction, ordered by the sorted class set.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ClassDistribution {
    probs: Vec<f64>,
}

impl ClassDistribution {
    pub(crate) fn new(probs: Vec<f64>) -> Self {
        Self { probs }
    }

    /// Position of the largest fraction. The lowest position wins ties.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        let mut best = 0;
        for (idx, &p) in self.probs.iter().enumerate() {
            if p > self.probs[best] {
                best = idx;
            }
        }
        best
    }

    /// The `k` most voted classes, most votes first.
    #[must_use]
    pub fn top_k(&self, k: usize) -> Vec<(usize, f64)> {
        let mut indexed: Vec<(usize, f64)> = self.probs.iter().copied().enumerate().collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1));
        indexed.truncate(k);
        indexed
    }

    /// Vote fractions in class order.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.probs
    }

    /// Consume the distribution and return the fractions.
    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.probs
    }
}

impl RandomForest {
    /// Predict the majority-vote label for a single sample.
    ///
    /// Vote ties go to the lowest label in sorted order.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if `sample` has the wrong width.
    pub fn predict(&self, sample: &[f64]) -> Result<&str, RfError> {
        let dist = self.predict_proba(sample)?;
        Ok(self.classes.get(dist.predicted_class()))
    }

    /// Fraction of trees voting for each class.
    ///
    /// Ordered by [`RandomForest::classes`] and summing to 1.0.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if `sample` has the wrong width.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<ClassDistribution, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }

        let mut votes = vec![0usize; self.classes.len()];
        for tree in &self.trees {
            let label = tree.predict(sample)?;
            votes[self.classes.require(label)?] += 1;
        }
        let n = self.trees.len() as f64;
        Ok(ClassDistribution::new(
            votes.into_iter().map(|v| v as f64 / n).collect(),
        ))
    }

    /// Predict labels for a batch of samples.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] on the first row of the wrong width.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<String>, RfError> {
        features
            .iter()
            .map(|sample| self.predict(sample).map(str::to_owned))
            .collect()
    }

    /// Return vote distributions for a batch of samples.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] on the first row of the wrong width.
    pub fn predict_proba_batch(
        &self,
        features: &[Vec<f64>],
    ) -> Result<Vec<ClassDistribution>, RfError> {
        features
            .iter()
            .map(|sample| self.predict_proba(sample))
            .collect()
    }

    /// Mean MDI importances of the trees, normalized to sum to 1.0.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let per_tree: Vec<Vec<f64>> = self
            .trees
            .iter()
            .map(DecisionTree::feature_importances)
            .collect();
        let mut totals = vec![0.0f64; self.n_features];
        for tree_imp in &per_tree {
            for (total, v) in totals.iter_mut().zip(tree_imp) {
                *total += v;
            }
        }
        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            totals.iter_mut().for_each(|v| *v /= sum);
        }
        totals
    }

    /// Importances paired with `names` and ranked, most important first.
    #[must_use]
    pub fn ranked_importances(&self, names: &[String]) -> Vec<RankedFeature> {
        let per_tree: Vec<Vec<f64>> = self
            .trees
            .iter()
            .map(DecisionTree::feature_importances)
            .collect();
        aggregate_importances(&per_tree, names)
    }

    /// Sorted labels seen during training.
    #[must_use]
    pub fn classes(&self) -> &ClassLabels {
        &self.classes
    }

    /// Borrow the member trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Row width the forest was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Tree count.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
