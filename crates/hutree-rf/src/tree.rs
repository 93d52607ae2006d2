use tracing::{debug, instrument};

use crate::RfError;
use crate::label::ClassLabels;
use crate::node::{Node, NodeIndex};
use crate::split::{MIN_GAIN, find_best_split, gini};

/// Growth limits for a single CART tree with Gini splits.
///
/// # Defaults
///
/// | Parameter | Default |
/// |---|---|
/// | `max_depth` | `None`, grow until pure or no gain |
/// | `min_samples_split` | 2 |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
}

impl DecisionTreeConfig {
    /// Config with the defaults above.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
        }
    }

    /// Cap the depth; the root sits at depth 0, so `Some(1)` allows one split.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Nodes holding fewer samples than this become leaves.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.min_samples_split = min_samples_split;
        self
    }

    /// Depth cap, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Smallest node size that may still split.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Grow a tree on `features` (one row per sample) and `labels`.
    ///
    /// A node becomes a leaf, checked in this order, when its labels are all
    /// identical, when its depth reaches `max_depth`, when it holds fewer than
    /// `min_samples_split` samples, or when the best split gains at most
    /// `1e-12`. Non-pure leaves predict the majority label; ties go to the
    /// label seen first among the node's samples.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | no rows |
    /// | [`RfError::ZeroFeatures`] | rows of width zero |
    /// | [`RfError::FeatureCountMismatch`] | a row differs in width from the first |
    /// | [`RfError::LabelCountMismatch`] | one label per row is not satisfied |
    /// | [`RfError::NonFiniteValue`] | a NaN or infinite value |
    /// | [`RfError::InvalidMinSamplesSplit`] | `min_samples_split < 2` |
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit<S: AsRef<str>>(
        &self,
        features: &[Vec<f64>],
        labels: &[S],
    ) -> Result<DecisionTree, RfError> {
        let n_features = validate_training_set(features, labels)?;
        self.validate()?;

        let classes = ClassLabels::from_labels(labels);
        let encoded = classes.encode(labels)?;
        debug!(n_features, n_classes = classes.len(), "growing decision tree");

        let mut grower = Grower {
            columns: transpose(features, n_features),
            labels: &encoded,
            n_classes: classes.len(),
            config: self,
            arena: Vec::new(),
        };
        let all: Vec<usize> = (0..features.len()).collect();
        grower.grow(&all, 0);

        debug!(n_nodes = grower.arena.len(), "decision tree grown");
        Ok(DecisionTree {
            nodes: grower.arena,
            n_features,
            classes,
        })
    }

    pub(crate) fn validate(&self) -> Result<(), RfError> {
        if self.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.min_samples_split,
            });
        }
        Ok(())
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Check shape and finiteness of a training set and return its feature count.
pub(crate) fn validate_training_set<S>(
    features: &[Vec<f64>],
    labels: &[S],
) -> Result<usize, RfError> {
    let Some(first) = features.first() else {
        return Err(RfError::EmptyDataset);
    };
    let width = first.len();
    if width == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != width {
            return Err(RfError::FeatureCountMismatch {
                expected: width,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(RfError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
    }
    Ok(width)
}

/// Column-major copy of `rows`, the layout the split search scans.
fn transpose(rows: &[Vec<f64>], n_features: usize) -> Vec<Vec<f64>> {
    (0..n_features)
        .map(|f| rows.iter().map(|row| row[f]).collect())
        .collect()
}

/// Majority class among `samples`, ties going to the class seen first.
fn majority_class(labels: &[usize], samples: &[usize], n_classes: usize) -> usize {
    let mut counts = vec![0usize; n_classes];
    let mut seen_order = Vec::new();
    for &s in samples {
        let class = labels[s];
        if counts[class] == 0 {
            seen_order.push(class);
        }
        counts[class] += 1;
    }
    seen_order
        .iter()
        .copied()
        .fold(None, |best: Option<usize>, class| match best {
            Some(b) if counts[b] >= counts[class] => Some(b),
            _ => Some(class),
        })
        .unwrap_or(0)
}

/// Recursive growth state for one tree.
struct Grower<'a> {
    columns: Vec<Vec<f64>>,
    labels: &'a [usize],
    n_classes: usize,
    config: &'a DecisionTreeConfig,
    arena: Vec<Node>,
}

impl Grower<'_> {
    /// Grow the subtree for `samples` and return its root slot.
    fn grow(&mut self, samples: &[usize], depth: usize) -> NodeIndex {
        let n_samples = samples.len();
        let mut counts = vec![0usize; self.n_classes];
        for &s in samples {
            counts[self.labels[s]] += 1;
        }
        let impurity = gini(&counts, n_samples);
        let leaf = Node::Leaf {
            class: majority_class(self.labels, samples, self.n_classes),
            impurity,
            n_samples,
        };

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let at_max_depth = self.config.max_depth.is_some_and(|d| depth >= d);
        if pure || at_max_depth || n_samples < self.config.min_samples_split {
            return self.push(leaf);
        }

        let Some(split) = find_best_split(&self.columns, self.labels, samples, self.n_classes)
            .filter(|s| s.gain > MIN_GAIN)
        else {
            return self.push(leaf);
        };

        // Parent slot precedes its children; the placeholder is replaced below.
        let slot = self.push(leaf);
        let left = self.grow(&split.left_indices, depth + 1);
        let right = self.grow(&split.right_indices, depth + 1);
        self.arena[slot.index()] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            impurity,
            n_samples,
            impurity_decrease: n_samples as f64 * split.gain,
        };
        slot
    }

    fn push(&mut self, node: Node) -> NodeIndex {
        self.arena.push(node);
        NodeIndex::new(self.arena.len() - 1)
    }
}

/// A fitted decision tree over string labels.
///
/// Nodes live in an arena with the root at index 0.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DecisionTree {
    pub(crate) nodes: Vec<Node>,
    pub(crate) n_features: usize,
    pub(crate) classes: ClassLabels,
}

impl DecisionTree {
    /// Label of the leaf `sample` falls into.
    ///
    /// `sample[feature] <= threshold` descends left.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if `sample` has the wrong width.
    pub fn predict(&self, sample: &[f64]) -> Result<&str, RfError> {
        Ok(self.classes.get(self.predict_class(sample)?))
    }

    /// One-hot probability vector over [`DecisionTree::classes`].
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if `sample` has the wrong width.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, RfError> {
        let class = self.predict_class(sample)?;
        let mut proba = vec![0.0; self.classes.len()];
        proba[class] = 1.0;
        Ok(proba)
    }

    /// [`DecisionTree::predict`] for each row.
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

    /// [`DecisionTree::predict_proba`] for each row.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] on the first row of the wrong width.
    pub fn predict_proba_batch(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, RfError> {
        features.iter().map(|sample| self.predict_proba(sample)).collect()
    }

    /// Mean-decrease-in-impurity importances, one per feature, summing to 1.0.
    ///
    /// Each split credits its feature with `n_samples * gain`. A tree that is
    /// a single leaf returns all zeros.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let mut credit = vec![0.0f64; self.n_features];
        for node in &self.nodes {
            if let Node::Split {
                feature,
                impurity_decrease,
                ..
            } = node
            {
                credit[feature.index()] += impurity_decrease;
            }
        }
        let total: f64 = credit.iter().sum();
        if total > 0.0 {
            for v in &mut credit {
                *v /= total;
            }
        }
        credit
    }

    /// Sorted class labels seen during training.
    #[must_use]
    pub fn classes(&self) -> &ClassLabels {
        &self.classes
    }

    /// Borrow the node arena; the root is at index 0.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Row width the tree was trained on.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Split and leaf count combined.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Leaf count.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Length of the longest root-to-leaf path; a lone root leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(NodeIndex::new(0), 0usize)];
        while let Some((idx, d)) = stack.pop() {
            match self.nodes.get(idx.index()) {
                Some(Node::Split { left, right, .. }) => {
                    stack.push((*left, d + 1));
                    stack.push((*right, d + 1));
                }
                Some(Node::Leaf { .. }) => deepest = deepest.max(d),
                None => {}
            }
        }
        deepest
    }

    fn predict_class(&self, sample: &[f64]) -> Result<usize, RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { class, .. } => return Ok(*class),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    idx = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Vec<Vec<f64>>, Vec<&'static str>) {
        let features = vec![
            vec![1.0, 0.0],
            vec![2.0, 0.0],
            vec![3.0, 0.0],
            vec![10.0, 0.0],
            vec![11.0, 0.0],
            vec![12.0, 0.0],
        ];
        (features, vec!["a", "a", "a", "b", "b", "b"])
    }

    /// One feature; the middle band needs a second split.
    fn band() -> (Vec<Vec<f64>>, Vec<&'static str>) {
        let features = vec![vec![1.0], vec![2.0], vec![3.0], vec![4.0]];
        (features, vec!["out", "in", "in", "out"])
    }

    #[test]
    fn no_rows_is_rejected() {
        let err = DecisionTreeConfig::new()
            .fit::<&str>(&[], &[])
            .unwrap_err();
        assert!(matches!(err, RfError::EmptyDataset));
    }

    #[test]
    fn single_class_grows_one_leaf() {
        let rows = [vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]];
        let tree = DecisionTreeConfig::new()
            .fit(&rows, &["Circle", "Circle", "Circle"])
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict(&[100.0, -3.0]).unwrap(), "Circle");
        assert!(tree.feature_importances().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn split_threshold_is_an_observed_value() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(tree.n_nodes(), 3);
        assert_eq!(tree.predict(&[2.0, 0.0]).unwrap(), "a");
        assert_eq!(tree.predict(&[11.0, 0.0]).unwrap(), "b");
        // threshold is the observed value 3.0, inclusive on the left
        assert_eq!(tree.predict(&[3.0, 0.0]).unwrap(), "a");
        assert_eq!(tree.predict(&[3.5, 0.0]).unwrap(), "b");
    }

    #[test]
    fn band_needs_depth_two() {
        let (features, labels) = band();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(tree.depth(), 2);
        assert_eq!(tree.predict_batch(&features).unwrap(), labels);
    }

    #[test]
    fn depth_cap_is_respected() {
        let (features, labels) = band();
        let tree = DecisionTreeConfig::new()
            .with_max_depth(Some(1))
            .fit(&features, &labels)
            .unwrap();
        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.n_leaves(), 2);
    }

    #[test]
    fn min_samples_split_stops_growth() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new()
            .with_min_samples_split(7)
            .fit(&features, &labels)
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
    }

    #[test]
    fn majority_tie_goes_to_first_seen_label() {
        // Identical rows cannot be split; the leaf holds a 2-2 tie.
        let features = vec![vec![1.0]; 4];
        let tree = DecisionTreeConfig::new()
            .fit(&features, &["zeta", "alpha", "alpha", "zeta"])
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict(&[1.0]).unwrap(), "zeta");
    }

    #[test]
    fn predict_proba_is_one_hot_over_sorted_classes() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert_eq!(tree.classes().as_slice(), ["a", "b"]);
        assert_eq!(tree.predict_proba(&[12.0, 0.0]).unwrap(), vec![0.0, 1.0]);
        assert_eq!(tree.predict_proba(&[0.0, 0.0]).unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn importances_credit_the_splitting_feature() {
        let features = vec![
            vec![1.0, 100.0],
            vec![2.0, 200.0],
            vec![3.0, 300.0],
            vec![10.0, 100.0],
            vec![11.0, 200.0],
            vec![12.0, 300.0],
        ];
        let labels = ["a", "a", "a", "b", "b", "b"];
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        let imp = tree.feature_importances();
        assert!((imp.iter().sum::<f64>() - 1.0).abs() < 1e-10);
        assert!((imp[0] - 1.0).abs() < 1e-10, "{imp:?}");
    }

    #[test]
    fn wrong_width_sample_is_rejected() {
        let (features, labels) = separable();
        let tree = DecisionTreeConfig::new().fit(&features, &labels).unwrap();
        assert!(matches!(
            tree.predict(&[1.0]),
            Err(RfError::PredictionFeatureMismatch { expected: 2, got: 1 })
        ));
    }

    #[test]
    fn input_validation_errors() {
        let cfg = DecisionTreeConfig::new();
        let err = cfg.fit(&[vec![1.0, 2.0], vec![3.0]], &["a", "b"]).unwrap_err();
        assert!(matches!(err, RfError::FeatureCountMismatch { sample_index: 1, .. }));

        let err = cfg.fit(&[vec![1.0, f64::NAN]], &["a"]).unwrap_err();
        assert!(matches!(err, RfError::NonFiniteValue { sample_index: 0, feature_index: 1 }));

        let err = cfg.fit(&[vec![1.0], vec![2.0]], &["a"]).unwrap_err();
        assert!(matches!(err, RfError::LabelCountMismatch { n_samples: 2, n_labels: 1 }));

        let err = cfg.fit(&[vec![]], &["a"]).unwrap_err();
        assert!(matches!(err, RfError::ZeroFeatures));
    }

    #[test]
    fn invalid_config_errors() {
        let (features, labels) = separable();
        let err = DecisionTreeConfig::new()
            .with_min_samples_split(1)
            .fit(&features, &labels)
            .unwrap_err();
        assert!(matches!(err, RfError::InvalidMinSamplesSplit { min_samples_split: 1 }));
    }

    #[test]
    fn zero_depth_cap_yields_majority_root_leaf() {
        let tree = DecisionTreeConfig::new()
            .with_max_depth(Some(0))
            .fit(&[vec![1.0], vec![2.0], vec![3.0]], &["a", "b", "a"])
            .unwrap();
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict(&[2.0]).unwrap(), "a");

        let tied = DecisionTreeConfig::new()
            .with_max_depth(Some(0))
            .fit(&[vec![1.0], vec![2.0]], &["b", "a"])
            .unwrap();
        assert_eq!(tied.predict(&[1.0]).unwrap(), "b");
    }
}
