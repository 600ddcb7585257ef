//! Majority vote with a deterministic tie-break.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::ForestError;
use crate::record::{Record, Value};

/// Return the most frequent item and its count.
///
/// Among items with equal counts, the one that appears first in `items`
/// wins. Returns `None` for an empty input.
pub(crate) fn majority_by_first_appearance<T, I>(items: I) -> Option<(T, usize)>
where
    T: Copy + Eq + Hash,
    I: IntoIterator<Item = T>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    let mut order: Vec<T> = Vec::new();
    for item in items {
        let count = counts.entry(item).or_insert(0);
        if *count == 0 {
            order.push(item);
        }
        *count += 1;
    }

    let mut best: Option<(T, usize)> = None;
    for item in order {
        let count = counts[&item];
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((item, count));
        }
    }
    best
}

/// Return the most frequent `target_attribute` value in `dataset`.
///
/// Ties go to the value that appears first.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`ForestError::EmptyDataset`] | `dataset` is empty |
/// | [`ForestError::MissingAttribute`] | a record lacks `target_attribute` |
pub fn majority_label(dataset: &[Record], target_attribute: &str) -> Result<Value, ForestError> {
    let labels = dataset
        .iter()
        .map(|record| record.value(target_attribute))
        .collect::<Result<Vec<_>, _>>()?;
    majority_by_first_appearance(labels)
        .map(|(class, _)| class.clone())
        .ok_or(ForestError::EmptyDataset)
}
