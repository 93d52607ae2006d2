//! Bootstrap-aggregated forests of Gini decision trees.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, instrument};

use crate::error::RfError;
use crate::label::ClassLabels;
use crate::tree::{DecisionTree, DecisionTreeConfig, validate_training_set};

/// Bagged ensemble settings.
///
///
/// # Defaults
///
/// | Parameter           | Default     |
/// |---------------------|-------------|
/// | `max_depth`         | `None`      |
/// | `min_samples_split` | 2           |
/// | `sample_ratio`      | 0.8         |
/// | `seed`              | 42          |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_estimators: usize,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) sample_ratio: f64,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Forest of `n_estimators` trees with the remaining defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::InvalidTreeCount`] if `n_estimators` is zero.
    pub fn new(n_estimators: usize) -> Result<Self, RfError> {
        if n_estimators == 0 {
            return Err(RfError::InvalidTreeCount { n_estimators });
        }
        Ok(Self {
            n_estimators,
            max_depth: None,
            min_samples_split: 2,
            sample_ratio: 0.8,
            seed: 42,
        })
    }

    /// Set the maximum depth of every tree.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to split a node.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Set the bootstrap size as a fraction of the training set, in (0.0, 1.0].
    #[must_use]
    pub fn with_sample_ratio(mut self, sample_ratio: f64) -> Self {
        self.sample_ratio = sample_ratio;
        self
    }

    /// Set the seed used by [`RandomForestConfig::fit`].
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Tree count.
    #[must_use]
    pub fn n_estimators(&self) -> usize {
        self.n_estimators
    }

    /// Per-tree depth cap.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Per-tree minimum split size.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Bootstrap size as a fraction of the training set.
    #[must_use]
    pub fn sample_ratio(&self) -> f64 {
        self.sample_ratio
    }

    /// Seed used by [`RandomForestConfig::fit`].
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a forest with a `ChaCha8Rng` seeded from [`RandomForestConfig::seed`].
    ///
    /// # Errors
    ///
    /// See [`RandomForestConfig::fit_with_rng`].
    pub fn fit<S: AsRef<str>>(
        &self,
        features: &[Vec<f64>],
        labels: &[S],
    ) -> Result<RandomForest, RfError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.fit_with_rng(features, labels, &mut rng)
    }

    /// Train a forest drawing every bootstrap index from `rng`.
    ///
    /// Each tree is trained on `round(n_samples * sample_ratio)` rows drawn
    /// uniformly with replacement. Trees are built one after another, so the
    /// same `rng` state always yields the same forest.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::InvalidSampleRatio`] | `sample_ratio` outside (0.0, 1.0] |
    /// | [`RfError::EmptyBootstrap`] | the ratio rounds to zero draws |
    /// | Tree errors | Invalid data or tree parameters, as for [`DecisionTreeConfig::fit`] |
    #[instrument(skip_all, fields(n_estimators = self.n_estimators, n_samples = features.len()))]
    pub fn fit_with_rng<S: AsRef<str>, R: Rng>(
        &self,
        features: &[Vec<f64>],
        labels: &[S],
        rng: &mut R,
    ) -> Result<RandomForest, RfError> {
        let n_features = validate_training_set(features, labels)?;
        let tree_config = DecisionTreeConfig::new()
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split);
        tree_config.validate()?;

        if !(self.sample_ratio > 0.0 && self.sample_ratio <= 1.0) {
            return Err(RfError::InvalidSampleRatio {
                ratio: self.sample_ratio,
            });
        }

        let n_samples = features.len();
        let draw_count = (n_samples as f64 * self.sample_ratio).round_ties_even() as usize;
        if draw_count == 0 {
            return Err(RfError::EmptyBootstrap {
                n_samples,
                ratio: self.sample_ratio,
            });
        }

        let classes = ClassLabels::from_labels(labels);

        info!(
            n_estimators = self.n_estimators,
            n_samples,
            n_features,
            n_classes = classes.len(),
            draw_count,
            "training random forest"
        );

        let mut trees = Vec::with_capacity(self.n_estimators);
        for tree_index in 0..self.n_estimators {
            let bootstrap = bootstrap_sample(n_samples, draw_count, rng);
            let boot_features: Vec<Vec<f64>> =
                bootstrap.iter().map(|&i| features[i].clone()).collect();
            let boot_labels: Vec<&str> = bootstrap.iter().map(|&i| labels[i].as_ref()).collect();

            let tree = tree_config.fit(&boot_features, &boot_labels)?;
            debug!(
                tree_index,
                n_nodes = tree.n_nodes(),
                depth = tree.depth(),
                "tree trained"
            );
            trees.push(tree);
        }

        Ok(RandomForest {
            trees,
            n_features,
            classes,
        })
    }
}

/// Draw `draw_count` indices in `0..n_samples` uniformly with replacement.
pub(crate) fn bootstrap_sample<R: Rng>(
    n_samples: usize,
    draw_count: usize,
    rng: &mut R,
) -> Vec<usize> {
    (0..draw_count).map(|_| rng.gen_range(0..n_samples)).collect()
}

/// Trained trees that vote on a label.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
    pub(crate) n_features: usize,
    pub(crate) classes: ClassLabels,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_blobs() -> (Vec<Vec<f64>>, Vec<String>) {
        let mut features = Vec::new();
        let mut labels = Vec::new();
        for (label, base) in [("Circle", 0.0), ("Square", 10.0), ("Triangle", 20.0)] {
            for i in 0..20 {
                features.push(vec![base + i as f64 * 0.1, (i % 3) as f64]);
                labels.push(label.to_string());
            }
        }
        (features, labels)
    }

    #[test]
    fn zero_trees_rejected() {
        let err = RandomForestConfig::new(0).unwrap_err();
        assert!(matches!(err, RfError::InvalidTreeCount { n_estimators: 0 }));
    }

    #[test]
    fn defaults() {
        let cfg = RandomForestConfig::new(50).unwrap();
        assert_eq!(cfg.n_estimators(), 50);
        assert_eq!(cfg.max_depth(), None);
        assert_eq!(cfg.min_samples_split(), 2);
        assert!((cfg.sample_ratio() - 0.8).abs() < f64::EPSILON);
        assert_eq!(cfg.seed(), 42);
    }

    #[test]
    fn sample_ratio_out_of_range() {
        let (features, labels) = three_blobs();
        for ratio in [0.0, -0.5, 1.5, f64::NAN] {
            let err = RandomForestConfig::new(3)
                .unwrap()
                .with_sample_ratio(ratio)
                .fit(&features, &labels)
                .unwrap_err();
            assert!(matches!(err, RfError::InvalidSampleRatio { .. }), "ratio {ratio}");
        }
    }

    #[test]
    fn tiny_ratio_draws_nothing() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let err = RandomForestConfig::new(2)
            .unwrap()
            .with_sample_ratio(0.1)
            .fit(&features, &["a", "b", "a"])
            .unwrap_err();
        assert!(matches!(err, RfError::EmptyBootstrap { n_samples: 3, .. }));
    }

    #[test]
    fn bootstrap_indices_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let sample = bootstrap_sample(10, 8, &mut rng);
        assert_eq!(sample.len(), 8);
        assert!(sample.iter().all(|&i| i < 10));
    }

    #[test]
    fn same_seed_same_forest() {
        let (features, labels) = three_blobs();
        let cfg = RandomForestConfig::new(5).unwrap().with_seed(9);
        let a = cfg.fit(&features, &labels).unwrap();
        let b = cfg.fit(&features, &labels).unwrap();
        let sizes = |f: &RandomForest| f.trees.iter().map(DecisionTree::n_nodes).collect::<Vec<_>>();
        assert_eq!(sizes(&a), sizes(&b));
        assert_eq!(a.predict_batch(&features).unwrap(), b.predict_batch(&features).unwrap());
    }

    #[test]
    fn forest_keeps_full_class_set() {
        let (features, labels) = three_blobs();
        let forest = RandomForestConfig::new(4).unwrap().fit(&features, &labels).unwrap();
        assert_eq!(forest.classes().as_slice(), ["Circle", "Square", "Triangle"]);
        assert_eq!(forest.n_trees(), 4);
        assert_eq!(forest.n_features(), 2);
    }
}
