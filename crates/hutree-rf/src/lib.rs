//! Decision-tree and random-forest classification over string labels.
//!
//! Provides CART trees with exhaustive Gini splits, bootstrap forests with
//! majority voting, shuffled k-fold cross-validation, confusion matrices and
//! mean-decrease-in-impurity feature importances. All randomness is drawn
//! from an injected generator or a seeded `ChaCha8Rng`.

mod classifier;
mod confusion;
mod error;
mod eval;
mod forest;
mod importance;
mod label;
mod node;
mod predict;
mod split;
mod tree;

pub use classifier::{Classifier, Estimator};
pub use confusion::{ClassMetrics, ConfusionMatrix};
pub use error::RfError;
pub use eval::{CrossValidation, CrossValidationResult, FoldPartition, fold_partition};
pub use forest::{RandomForest, RandomForestConfig};
pub use importance::RankedFeature;
pub use label::ClassLabels;
pub use node::{FeatureIndex, Impurity, Node, NodeIndex};
pub use predict::ClassDistribution;
pub use split::gini;
pub use tree::{DecisionTree, DecisionTreeConfig};
