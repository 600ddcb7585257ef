//! Numeric decision trees and random forests: train, predict, evaluate.
//!
//! Trees split on numeric attributes at midpoint thresholds chosen by
//! greedy information gain. Forests bag trees over bootstrap samples,
//! optionally drawing a random subset of attributes at every node, and
//! predict by majority vote. Training is deterministic for a given seed
//! and trees are built in parallel via rayon.

mod config;
mod error;
mod forest;
mod holdout;
mod node;
mod predict;
mod record;
mod split;
mod tree;
mod vote;

pub use config::RandomForestConfig;
pub use error::ForestError;
pub use forest::RandomForest;
pub use holdout::HoldoutSplit;
pub use node::Node;
pub use record::{Record, Value};
pub use split::{class_entropy, entropy, information_gain};
pub use tree::{DecisionTree, DecisionTreeConfig};
pub use vote::majority_label;
