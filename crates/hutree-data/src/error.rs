//! Error types for hutree-data.

use hutree_rf::RfError;

/// Errors from building datasets and training on them.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// Returned when the synthetic builder is asked for zero samples per class.
    #[error("samples per class must be >= 1, got {per_class}")]
    InvalidClassSize {
        /// The rejected per-class count.
        per_class: usize,
    },

    /// Returned when the synthetic canvas has zero side length.
    #[error("canvas side must be >= 1, got {canvas}")]
    InvalidCanvas {
        /// The rejected canvas side.
        canvas: usize,
    },

    /// Returned when a sample with NaN or infinite features is pushed into a dataset.
    #[error("sample {sample_index} ({label}) has non-finite features")]
    NonFiniteFeatures {
        /// Index the sample would have taken.
        sample_index: usize,
        /// Label of the rejected sample.
        label: String,
    },

    /// Returned when training or evaluation on the dataset fails.
    #[error(transparent)]
    Model(#[from] RfError),
}
