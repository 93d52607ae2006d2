//! Arena node types and index newtypes.

use std::fmt;

/// Column of a feature row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct FeatureIndex(usize);

impl FeatureIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Column position.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for FeatureIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Slot of a node in a tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct NodeIndex(usize);

impl NodeIndex {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena position.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Gini impurity of a node.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize)]
pub struct Impurity(f64);

impl Impurity {
    pub(crate) fn new(value: f64) -> Self {
        Self(value)
    }

    /// Gini value in `[0, 1 - 1/k]`.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Impurity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}", self.value())
    }
}

/// One arena entry: an interior split or a leaf.
///
/// The root occupies slot 0 and every parent precedes its children.
#[derive(Debug, Clone, serde::Serialize)]
pub enum Node {
    /// Routes a sample by comparing one feature against `threshold`.
    Split {
        /// Compared column.
        feature: FeatureIndex,
        /// Observed training value; `<=` goes left.
        threshold: f64,
        /// Child for `<= threshold`.
        left: NodeIndex,
        /// Child for `> threshold`.
        right: NodeIndex,
        /// Gini of the samples reaching this node.
        impurity: Impurity,
        /// Training samples reaching this node.
        n_samples: usize,
        /// Gini gain of the split weighted by `n_samples`.
        impurity_decrease: f64,
    },
    /// Terminal node carrying a class.
    Leaf {
        /// Predicted class, as a position in the tree's class set.
        class: usize,
        /// Gini of the leaf samples.
        impurity: Impurity,
        /// Training samples ending here.
        n_samples: usize,
    },
}

impl Node {
    /// Gini of the samples reaching this node.
    #[must_use]
    pub fn impurity(&self) -> Impurity {
        match self {
            Node::Split { impurity: i, .. } | Node::Leaf { impurity: i, .. } => *i,
        }
    }

    /// Training samples reaching this node.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        match self {
            Node::Split { n_samples: n, .. } | Node::Leaf { n_samples: n, .. } => *n,
        }
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_newtypes_roundtrip() {
        assert_eq!(FeatureIndex::new(6).index(), 6);
        assert_eq!(NodeIndex::new(42).index(), 42);
        assert!(NodeIndex::new(1) < NodeIndex::new(2));
        assert_eq!(format!("{}", FeatureIndex::new(3)), "3");
    }

    #[test]
    fn impurity_display() {
        assert_eq!(format!("{}", Impurity::new(0.5)), "0.500000");
        assert_eq!(format!("{}", Impurity::new(0.0)), "0.000000");
    }

    #[test]
    fn node_accessors() {
        let leaf = Node::Leaf {
            class: 1,
            impurity: Impurity::new(0.0),
            n_samples: 10,
        };
        let split = Node::Split {
            feature: FeatureIndex::new(4),
            threshold: 3.5,
            left: NodeIndex::new(1),
            right: NodeIndex::new(2),
            impurity: Impurity::new(0.375),
            n_samples: 20,
            impurity_decrease: 4.0,
        };
        assert!(leaf.is_leaf());
        assert!(!split.is_leaf());
        assert_eq!(leaf.n_samples(), 10);
        assert_eq!(split.n_samples(), 20);
        assert!((split.impurity().value() - 0.375).abs() < f64::EPSILON);
    }
}
