//! Batch prediction and accuracy for trees and forests.

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};

use crate::error::ForestError;
use crate::forest::RandomForest;
use crate::node::Node;
use crate::record::{Record, Value};
use crate::tree::DecisionTree;
use crate::vote::majority_by_first_appearance;

/// Fraction of `predictions` equal to each record's `target_attribute`.
fn accuracy(
    predictions: &[&Value],
    dataset: &[Record],
    target_attribute: &str,
) -> Result<f64, ForestError> {
    if dataset.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    let mut correct = 0usize;
    for (predicted, record) in predictions.iter().zip(dataset) {
        if *predicted == record.value(target_attribute)? {
            correct += 1;
        }
    }
    Ok(correct as f64 / dataset.len() as f64)
}

impl Node {
    /// Predict the class of every record, preserving order.
    ///
    /// # Errors
    ///
    /// Fails on the first record that [`Node::predict`] rejects.
    pub fn predict_batch(&self, dataset: &[Record]) -> Result<Vec<&Value>, ForestError> {
        dataset
            .par_iter()
            .map(|instance| self.predict(instance))
            .collect()
    }

    /// Fraction of records whose prediction equals their `target_attribute`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::EmptyDataset`] | `dataset` is empty |
    /// | [`ForestError::MissingAttribute`] | a record lacks a tested attribute or the target |
    /// | [`ForestError::NonNumericValue`] | a tested attribute holds text |
    pub fn evaluate(&self, dataset: &[Record], target_attribute: &str) -> Result<f64, ForestError> {
        if dataset.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        let predictions = self.predict_batch(dataset)?;
        accuracy(&predictions, dataset, target_attribute)
    }
}

impl DecisionTree {
    /// Predict the class of every record, preserving order.
    ///
    /// # Errors
    ///
    /// See [`Node::predict_batch`].
    pub fn predict_batch(&self, dataset: &[Record]) -> Result<Vec<&Value>, ForestError> {
        self.root.predict_batch(dataset)
    }

    /// Fraction of records whose prediction equals their `target_attribute`.
    ///
    /// # Errors
    ///
    /// See [`Node::evaluate`].
    pub fn evaluate(&self, dataset: &[Record], target_attribute: &str) -> Result<f64, ForestError> {
        self.root.evaluate(dataset, target_attribute)
    }
}

impl RandomForest {
    /// Predict the class of a single instance by majority vote.
    ///
    /// Each tree casts one vote. When several classes tie for the most votes,
    /// the one voted by the earliest tree in the forest wins.
    ///
    /// # Errors
    ///
    /// See [`Node::predict`].
    pub fn predict(&self, instance: &Record) -> Result<&Value, ForestError> {
        let votes = self
            .trees
            .iter()
            .map(|tree| tree.predict(instance))
            .collect::<Result<Vec<_>, _>>()?;
        majority_by_first_appearance(votes)
            .map(|(class, _)| class)
            .ok_or(ForestError::InvalidTreeCount { n_trees: 0 })
    }

    /// Predict the class of every record in parallel, preserving order.
    ///
    /// # Errors
    ///
    /// Fails on the first record that [`RandomForest::predict`] rejects.
    pub fn predict_batch(&self, dataset: &[Record]) -> Result<Vec<&Value>, ForestError> {
        dataset
            .par_iter()
            .map(|instance| self.predict(instance))
            .collect()
    }

    /// Fraction of records whose forest prediction equals their
    /// `target_attribute`.
    ///
    /// # Errors
    ///
    /// See [`Node::evaluate`].
    pub fn evaluate(&self, dataset: &[Record], target_attribute: &str) -> Result<f64, ForestError> {
        if dataset.is_empty() {
            return Err(ForestError::EmptyDataset);
        }
        let predictions = self.predict_batch(dataset)?;
        accuracy(&predictions, dataset, target_attribute)
    }

    /// Return the trees in training order.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Return the number of trees in the ensemble.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
