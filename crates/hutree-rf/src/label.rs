//! Sorted class-label sets.

use std::collections::BTreeSet;

use crate::error::RfError;

/// The distinct class labels of a training set, in ascending order.
///
/// Probability vectors and confusion-matrix rows are indexed by position in
/// this set.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ClassLabels(Vec<String>);

impl ClassLabels {
    /// Collect the distinct labels of `labels`, sorted.
    #[must_use]
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Self {
        let set: BTreeSet<&str> = labels.iter().map(AsRef::as_ref).collect();
        Self(set.into_iter().map(str::to_owned).collect())
    }

    /// Position of `label`, if present.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.0.binary_search_by(|probe| probe.as_str().cmp(label)).ok()
    }

    /// Position of `label`.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::UnknownLabel`] when `label` is not in the set.
    pub fn require(&self, label: &str) -> Result<usize, RfError> {
        self.index_of(label).ok_or_else(|| RfError::UnknownLabel {
            label: label.to_owned(),
        })
    }

    /// Label at position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[must_use]
    pub fn get(&self, index: usize) -> &str {
        &self.0[index]
    }

    /// Number of classes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return true if there are no classes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Labels as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Map every label to its position.
    pub(crate) fn encode<S: AsRef<str>>(&self, labels: &[S]) -> Result<Vec<usize>, RfError> {
        labels.iter().map(|l| self.require(l.as_ref())).collect()
    }
}
