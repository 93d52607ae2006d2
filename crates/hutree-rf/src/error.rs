//! Error type for hutree-rf.

/// Errors from training, prediction and evaluation.
///
/// Degenerate but valid inputs (a single class, splits without gain, empty
/// partitions) never produce an error; they yield leaves instead.
#[derive(Debug, thiserror::Error)]
pub enum RfError {
    /// A forest was configured with zero trees.
    #[error("a forest needs at least one tree, got n_estimators = {n_estimators}")]
    InvalidTreeCount {
        /// Rejected tree count.
        n_estimators: usize,
    },

    /// `min_samples_split` below 2; a node of one sample cannot split.
    #[error("min_samples_split = {min_samples_split} is below the minimum of 2")]
    InvalidMinSamplesSplit {
        /// Rejected threshold.
        min_samples_split: usize,
    },

    /// `sample_ratio` outside `(0.0, 1.0]`.
    #[error("sample_ratio = {ratio} lies outside (0.0, 1.0]")]
    InvalidSampleRatio {
        /// Rejected ratio.
        ratio: f64,
    },

    /// `round(n_samples * sample_ratio)` came out as zero.
    #[error("bootstrap of {n_samples} samples at ratio {ratio} draws no samples")]
    EmptyBootstrap {
        /// Training set size.
        n_samples: usize,
        /// Configured ratio.
        ratio: f64,
    },

    /// Cross-validation asked for fewer than two folds.
    #[error("cross-validation needs at least 2 folds, got {n_folds}")]
    InvalidFoldCount {
        /// Rejected fold count.
        n_folds: usize,
    },

    /// Fewer samples than folds, so every test block would be empty.
    #[error("{n_samples} samples cannot fill {n_folds} folds")]
    TooFewSamplesForFolds {
        /// Dataset size.
        n_samples: usize,
        /// Requested folds.
        n_folds: usize,
    },

    /// No rows to train or evaluate on.
    #[error("dataset is empty")]
    EmptyDataset,

    /// Rows exist but carry no features.
    #[error("rows have no feature columns")]
    ZeroFeatures,

    /// A training row is wider or narrower than the first row.
    #[error("row {sample_index} has width {got}, rows before it have width {expected}")]
    FeatureCountMismatch {
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        got: usize,
        /// Offending row.
        sample_index: usize,
    },

    /// Labels and feature rows differ in count.
    #[error("{n_labels} labels for {n_samples} samples")]
    LabelCountMismatch {
        /// Feature row count.
        n_samples: usize,
        /// Label count.
        n_labels: usize,
    },

    /// A sample passed to a fitted model has the wrong width.
    #[error("model was trained on {expected} features, sample has {got}")]
    PredictionFeatureMismatch {
        /// Training width.
        expected: usize,
        /// Sample width.
        got: usize,
    },

    /// NaN or infinity in the training data.
    #[error("value at row {sample_index}, column {feature_index} is not finite")]
    NonFiniteValue {
        /// Offending row.
        sample_index: usize,
        /// Offending column.
        feature_index: usize,
    },

    /// A label outside the known class set.
    #[error("unknown class label {label:?}")]
    UnknownLabel {
        /// The unrecognized label.
        label: String,
    },
}
