use crate::node::{FeatureIndex, Impurity};

/// Gains at or below this are treated as no improvement.
pub(crate) const MIN_GAIN: f64 = 1e-12;

/// Gini impurity `1 - Σ p_i²` of a node from its class counts.
///
/// Returns `Impurity(0.0)` when `n_samples` is zero.
#[must_use]
pub fn gini(class_counts: &[usize], n_samples: usize) -> Impurity {
    if n_samples == 0 {
        return Impurity::new(0.0);
    }
    let n = n_samples as f64;
    let sum_sq: f64 = class_counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum();
    Impurity::new(1.0 - sum_sq)
}

/// Winning split of a node and the partition it induces.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Compared column.
    pub(crate) feature: FeatureIndex,
    /// Threshold value; an observed value of `feature`.
    pub(crate) threshold: f64,
    /// Gini gain: parent impurity minus the size-weighted child impurities.
    pub(crate) gain: f64,
    /// Sample indices going to the left child, in input order.
    pub(crate) left_indices: Vec<usize>,
    /// Sample indices going to the right child, in input order.
    pub(crate) right_indices: Vec<usize>,
}

/// Find the split with the largest Gini gain.
///
/// Every feature is tried in column order. For each feature the distinct
/// observed values are candidate thresholds in ascending order, with
/// `value <= threshold` going left. Candidates leaving either side empty are
/// skipped. A candidate must beat the best gain so far strictly (starting
/// from 0.0), so the first of several equal gains wins.
///
/// Returns `None` when no candidate has positive gain.
///
/// # Column-major layout
///
/// `features[f][s]` is feature `f` of sample `s`.
/// `labels` holds class positions and `sample_indices` indexes both.
pub(crate) fn find_best_split(
    features: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
) -> Option<SplitResult> {
    let n_samples = sample_indices.len();
    if n_samples < 2 || features.is_empty() {
        return None;
    }

    let mut parent_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        parent_counts[labels[si]] += 1;
    }
    let parent_impurity = gini(&parent_counts, n_samples).value();
    let total = n_samples as f64;

    let mut best_gain = 0.0f64;
    let mut best: Option<(FeatureIndex, f64)> = None;

    for (feat_idx, feat_col) in features.iter().enumerate() {
        let mut sorted: Vec<(f64, usize)> = sample_indices
            .iter()
            .map(|&si| (feat_col[si], labels[si]))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        // Left grows from empty, right shrinks from full.
        let mut left_counts = vec![0usize; n_classes];
        let mut right_counts = parent_counts.clone();

        for i in 0..(n_samples - 1) {
            let (value, class) = sorted[i];
            left_counts[class] += 1;
            right_counts[class] -= 1;

            // Only the last occurrence of a value is a threshold boundary.
            if value == sorted[i + 1].0 {
                continue;
            }

            let n_left = i + 1;
            let n_right = n_samples - n_left;
            let weighted = (n_left as f64 / total) * gini(&left_counts, n_left).value()
                + (n_right as f64 / total) * gini(&right_counts, n_right).value();
            let gain = parent_impurity - weighted;

            if gain > best_gain {
                best_gain = gain;
                best = Some((FeatureIndex::new(feat_idx), value));
            }
        }
    }

    let (feature, threshold) = best?;

    let feat_col = &features[feature.index()];
    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .copied()
        .partition(|&si| feat_col[si] <= threshold);

    Some(SplitResult {
        feature,
        threshold,
        gain: best_gain,
        left_indices,
        right_indices,
    })
}
