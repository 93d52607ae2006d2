//! Shuffled k-fold cross-validation for any [`Estimator`].

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, instrument};

use crate::classifier::{Classifier, Estimator};
use crate::confusion::ConfusionMatrix;
use crate::error::RfError;
use crate::importance::{RankedFeature, aggregate_importances};
use crate::label::ClassLabels;
use crate::tree::validate_training_set;

/// Shuffled k-fold evaluation settings.
///
/// `seed` drives the shuffle and every fold's training.
///
/// # Defaults
///
/// | Parameter | Default |
/// |-----------|---------|
/// | `seed`    | 42      |
#[derive(Debug, Clone)]
pub struct CrossValidation {
    n_folds: usize,
    seed: u64,
}

/// Results of k-fold cross-validation.
#[derive(Debug, serde::Serialize)]
pub struct CrossValidationResult {
    /// Accuracy of each fold, in fold order.
    pub fold_accuracies: Vec<f64>,
    /// Confusion matrix pooled over every fold's test predictions.
    pub confusion_matrix: ConfusionMatrix,
    /// Unweighted mean of `fold_accuracies`.
    pub mean_accuracy: f64,
    /// Population standard deviation of fold accuracies.
    pub std_accuracy: f64,
    /// Per-feature importances summed over folds, normalized to 1.0.
    pub feature_importances: Vec<f64>,
    /// Number of folds.
    pub n_folds: usize,
    /// Samples per test fold, `⌊n_samples / n_folds⌋`.
    pub fold_size: usize,
    /// Dataset size, including rows left out of every test block.
    pub n_samples: usize,
    /// Number of features.
    pub n_features: usize,
    /// Number of classes.
    pub n_classes: usize,
}

impl CrossValidationResult {
    /// Pair the fold-summed importances with `names`, ranked.
    #[must_use]
    pub fn ranked_importances(&self, names: &[String]) -> Vec<RankedFeature> {
        aggregate_importances(std::slice::from_ref(&self.feature_importances), names)
    }
}

/// A shuffled sample order cut into equal test blocks.
///
/// Fold `i` tests on `order[i * fold_size .. (i + 1) * fold_size]` and trains on
/// every other position, including the `n_samples % n_folds` trailing samples
/// that are never tested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldPartition {
    order: Vec<usize>,
    n_folds: usize,
    fold_size: usize,
}

impl FoldPartition {
    /// Test indices of fold `fold`.
    ///
    /// # Panics
    ///
    /// Panics if `fold >= n_folds`.
    #[must_use]
    pub fn test_indices(&self, fold: usize) -> &[usize] {
        assert!(fold < self.n_folds, "fold {fold} out of range");
        &self.order[fold * self.fold_size..(fold + 1) * self.fold_size]
    }

    /// Training indices of fold `fold`: the shuffled order with the test block removed.
    ///
    /// # Panics
    ///
    /// Panics if `fold >= n_folds`.
    #[must_use]
    pub fn train_indices(&self, fold: usize) -> Vec<usize> {
        assert!(fold < self.n_folds, "fold {fold} out of range");
        let (start, end) = (fold * self.fold_size, (fold + 1) * self.fold_size);
        self.order[..start]
            .iter()
            .chain(&self.order[end..])
            .copied()
            .collect()
    }

    /// Number of folds.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Samples per test fold.
    #[must_use]
    pub fn fold_size(&self) -> usize {
        self.fold_size
    }

    /// The full shuffled order.
    #[must_use]
    pub fn order(&self) -> &[usize] {
        &self.order
    }
}

/// Shuffle `0..n_samples` once with `rng` and cut it into `n_folds` blocks of `⌊n/k⌋`.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`RfError::InvalidFoldCount`] | `n_folds` < 2 |
/// | [`RfError::EmptyDataset`] | `n_samples` is zero |
/// | [`RfError::TooFewSamplesForFolds`] | `n_samples` < `n_folds` |
pub fn fold_partition<R: Rng>(
    n_samples: usize,
    n_folds: usize,
    rng: &mut R,
) -> Result<FoldPartition, RfError> {
    if n_folds < 2 {
        return Err(RfError::InvalidFoldCount { n_folds });
    }
    if n_samples == 0 {
        return Err(RfError::EmptyDataset);
    }
    let fold_size = n_samples / n_folds;
    if fold_size == 0 {
        return Err(RfError::TooFewSamplesForFolds { n_samples, n_folds });
    }
    let mut order: Vec<usize> = (0..n_samples).collect();
    order.shuffle(rng);
    Ok(FoldPartition {
        order,
        n_folds,
        fold_size,
    })
}

impl CrossValidation {
    /// Evaluate with `n_folds` folds and seed 42.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidFoldCount`] if `n_folds` < 2.
    pub fn new(n_folds: usize) -> Result<Self, RfError> {
        if n_folds < 2 {
            return Err(RfError::InvalidFoldCount { n_folds });
        }
        Ok(Self { n_folds, seed: 42 })
    }

    /// Set the seed used by [`CrossValidation::evaluate`].
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Fold count.
    #[must_use]
    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Shuffle seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run k-fold cross-validation with a `ChaCha8Rng` seeded from [`CrossValidation::seed`].
    ///
    /// # Errors
    ///
    /// See [`CrossValidation::evaluate_with_rng`].
    pub fn evaluate<E: Estimator, S: AsRef<str>>(
        &self,
        estimator: &E,
        features: &[Vec<f64>],
        labels: &[S],
    ) -> Result<CrossValidationResult, RfError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.evaluate_with_rng(estimator, features, labels, &mut rng)
    }

    /// Run k-fold cross-validation.
    ///
    /// The sample order is shuffled once with `rng`; each fold then trains a
    /// fresh model from `estimator` on its training rows, drawing from the
    /// same `rng`, and scores `correct / test_size` on its test block.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | Zero samples |
    /// | [`RfError::LabelCountMismatch`] | `labels` and `features` differ in length |
    /// | [`RfError::TooFewSamplesForFolds`] | Fewer samples than folds |
    /// | Other errors | From the estimator's training |
    #[instrument(skip_all, fields(n_folds = self.n_folds, n_samples = features.len()))]
    pub fn evaluate_with_rng<E: Estimator, S: AsRef<str>, R: Rng>(
        &self,
        estimator: &E,
        features: &[Vec<f64>],
        labels: &[S],
        rng: &mut R,
    ) -> Result<CrossValidationResult, RfError> {
        let n_features = validate_training_set(features, labels)?;
        let n_samples = features.len();
        let classes = ClassLabels::from_labels(labels);
        let partition = fold_partition(n_samples, self.n_folds, rng)?;

        let mut fold_accuracies = Vec::with_capacity(self.n_folds);
        let mut all_true: Vec<&str> = Vec::new();
        let mut all_predicted: Vec<String> = Vec::new();
        let mut all_importances: Vec<Vec<f64>> = Vec::with_capacity(self.n_folds);

        for fold in 0..self.n_folds {
            let test_idx = partition.test_indices(fold);
            let train_idx = partition.train_indices(fold);

            let train_features: Vec<Vec<f64>> =
                train_idx.iter().map(|&i| features[i].clone()).collect();
            let train_labels: Vec<&str> = train_idx.iter().map(|&i| labels[i].as_ref()).collect();
            let test_features: Vec<Vec<f64>> =
                test_idx.iter().map(|&i| features[i].clone()).collect();
            let test_labels: Vec<&str> = test_idx.iter().map(|&i| labels[i].as_ref()).collect();

            let model = estimator.fit_with_rng(&train_features, &train_labels, rng)?;
            let predictions = model.predict_labels(&test_features)?;

            let correct = predictions
                .iter()
                .zip(&test_labels)
                .filter(|&(p, t)| p == t)
                .count();
            let accuracy = correct as f64 / test_labels.len() as f64;
            fold_accuracies.push(accuracy);

            info!(
                fold = fold + 1,
                accuracy,
                n_train = train_idx.len(),
                n_test = test_idx.len(),
                "fold completed"
            );

            all_true.extend_from_slice(&test_labels);
            all_predicted.extend(predictions);
            all_importances.push(model.feature_importances());
        }

        let mean_accuracy = fold_accuracies.iter().sum::<f64>() / self.n_folds as f64;
        let std_accuracy = {
            let variance = fold_accuracies
                .iter()
                .map(|&a| (a - mean_accuracy).powi(2))
                .sum::<f64>()
                / self.n_folds as f64;
            variance.sqrt()
        };

        let confusion_matrix = ConfusionMatrix::from_labels(&all_true, &all_predicted, &classes)?;
        let feature_importances = sum_normalized(&all_importances, n_features);

        info!(mean_accuracy, std_accuracy, "cross-validation complete");

        Ok(CrossValidationResult {
            fold_accuracies,
            confusion_matrix,
            mean_accuracy,
            std_accuracy,
            feature_importances,
            n_folds: self.n_folds,
            fold_size: partition.fold_size(),
            n_samples,
            n_features,
            n_classes: classes.len(),
        })
    }
}

fn sum_normalized(per_model: &[Vec<f64>], n_features: usize) -> Vec<f64> {
    let mut totals = vec![0.0f64; n_features];
    for imp in per_model {
        for (total, v) in totals.iter_mut().zip(imp) {
            *total += v;
        }
    }
    let sum: f64 = totals.iter().sum();
    if sum > 0.0 {
        totals.iter_mut().for_each(|v| *v /= sum);
    }
    totals
}
