use rand::Rng;

use crate::error::ForestError;
use crate::record::Record;
use crate::vote::majority_by_first_appearance;

/// Shannon entropy, in bits, of a class-count distribution.
///
/// Computes `-Σ (c_i/n) · log2(c_i/n)` over classes with `c_i > 0`.
/// Returns `0.0` when `n_samples` is zero.
#[must_use]
pub fn entropy(class_counts: &[usize], n_samples: usize) -> f64 {
    if n_samples == 0 {
        return 0.0;
    }
    let n = n_samples as f64;
    -class_counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Information gain of splitting `parent_counts` into `lesser_counts` and the
/// remainder.
///
/// Both slices are indexed by class; a missing trailing class counts as zero.
/// Returns `0.0` when either side of the split is empty, or when some class
/// has more lesser records than parent records, since no split of
/// `parent_counts` produces such counts.
#[must_use]
pub fn information_gain(parent_counts: &[usize], lesser_counts: &[usize]) -> f64 {
    let n: usize = parent_counts.iter().sum();
    let n_lesser: usize = lesser_counts.iter().sum();
    if n_lesser == 0 || n_lesser >= n {
        return 0.0;
    }
    let n_classes = parent_counts.len().max(lesser_counts.len());
    let greater_counts: Option<Vec<usize>> = (0..n_classes)
        .map(|class| {
            let parent = parent_counts.get(class).copied().unwrap_or(0);
            let lesser = lesser_counts.get(class).copied().unwrap_or(0);
            parent.checked_sub(lesser)
        })
        .collect();
    let Some(greater_counts) = greater_counts else {
        return 0.0;
    };
    weighted_gain(
        entropy(parent_counts, n),
        lesser_counts,
        n_lesser,
        &greater_counts,
        n - n_lesser,
    )
}

/// Entropy, in bits, of the target attribute's values across `dataset`.
///
/// # Errors
///
/// Returns [`ForestError::MissingAttribute`] when a record lacks `target_attribute`.
pub fn class_entropy(dataset: &[Record], target_attribute: &str) -> Result<f64, ForestError> {
    let labels = dataset
        .iter()
        .map(|r| r.value(target_attribute))
        .collect::<Result<Vec<_>, _>>()?;
    let mut classes = Vec::new();
    let mut counts: Vec<usize> = Vec::new();
    for label in labels {
        match classes.iter().position(|c| *c == label) {
            Some(idx) => counts[idx] += 1,
            None => {
                classes.push(label);
                counts.push(1);
            }
        }
    }
    Ok(entropy(&counts, dataset.len()))
}

fn weighted_gain(
    parent_entropy: f64,
    lesser_counts: &[usize],
    n_lesser: usize,
    greater_counts: &[usize],
    n_greater: usize,
) -> f64 {
    let n = (n_lesser + n_greater) as f64;
    parent_entropy
        - (n_lesser as f64 / n) * entropy(lesser_counts, n_lesser)
        - (n_greater as f64 / n) * entropy(greater_counts, n_greater)
}

/// Best split found for a node.
#[derive(Debug, Clone)]
pub(crate) struct SplitResult {
    /// Column index of the chosen attribute.
    pub(crate) attribute: usize,
    /// Records with `value < threshold` go to the lesser side.
    pub(crate) threshold: f64,
    /// Information gain of the split, in bits.
    pub(crate) gain: f64,
    /// Sample indices going to the lesser child.
    pub(crate) lesser_indices: Vec<usize>,
    /// Sample indices going to the greater-equal child.
    pub(crate) greater_equal_indices: Vec<usize>,
}

/// Choose the candidate attributes for one node.
///
/// With `num_random_attributes == None` every attribute is a candidate, in
/// column order. Otherwise draws `min(k, n_attributes)` distinct attributes
/// uniformly at random; the draw order is the candidate order.
pub(crate) fn candidate_attributes(
    n_attributes: usize,
    num_random_attributes: Option<usize>,
    rng: &mut impl Rng,
) -> Vec<usize> {
    let mut order: Vec<usize> = (0..n_attributes).collect();
    let Some(k) = num_random_attributes else {
        return order;
    };
    // Partial Fisher-Yates: shuffle only the first `take` positions.
    let take = k.min(n_attributes);
    for i in 0..take {
        let j = rng.gen_range(i..n_attributes);
        order.swap(i, j);
    }
    order.truncate(take);
    order
}

/// Find the split with maximal information gain among `candidates`.
///
/// For each candidate column, sorts the `(value, label)` pairs (stable) and
/// considers the midpoint of every adjacent pair whose labels differ. The
/// records below a threshold always form a prefix of the sorted order, so a
/// single left-to-right sweep with incremental class counts scores every
/// threshold.
///
/// Ties resolve to the first maximal candidate: by candidate order across
/// attributes, then by ascending threshold. An attribute without any label
/// transition contributes `(smallest value, 0.0)`.
///
/// Returns `None` only when `candidates` or `sample_indices` is empty.
///
/// # Column-major layout
///
/// `columns[attribute][sample]`; `sample_indices` index the inner `Vec`s.
pub(crate) fn find_best_split(
    columns: &[Vec<f64>],
    labels: &[usize],
    sample_indices: &[usize],
    n_classes: usize,
    candidates: &[usize],
) -> Option<SplitResult> {
    let n_samples = sample_indices.len();
    if n_samples == 0 {
        return None;
    }

    let mut parent_counts = vec![0usize; n_classes];
    for &si in sample_indices {
        parent_counts[labels[si]] += 1;
    }
    let parent_entropy = entropy(&parent_counts, n_samples);

    let mut best: Option<(usize, f64, f64)> = None;
    let mut lesser_counts = vec![0usize; n_classes];
    let mut greater_counts = vec![0usize; n_classes];

    for &attribute in candidates {
        let column = &columns[attribute];

        let mut sorted: Vec<(f64, usize)> = sample_indices
            .iter()
            .map(|&si| (column[si], labels[si]))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        lesser_counts.fill(0);
        let mut n_lesser = 0usize;
        let mut attribute_best: Option<(f64, f64)> = None;

        for i in 0..(n_samples - 1) {
            let (value, class) = sorted[i];
            let (next_value, next_class) = sorted[i + 1];
            if class == next_class {
                continue;
            }
            let threshold = (value + next_value) / 2.0;

            // Thresholds are non-decreasing, so the lesser prefix only grows.
            while n_lesser < n_samples && sorted[n_lesser].0 < threshold {
                lesser_counts[sorted[n_lesser].1] += 1;
                n_lesser += 1;
            }

            let gain = if n_lesser == 0 || n_lesser == n_samples {
                0.0
            } else {
                for (g, (&p, &l)) in greater_counts
                    .iter_mut()
                    .zip(parent_counts.iter().zip(&lesser_counts))
                {
                    *g = p - l;
                }
                weighted_gain(
                    parent_entropy,
                    &lesser_counts,
                    n_lesser,
                    &greater_counts,
                    n_samples - n_lesser,
                )
            };

            if attribute_best.is_none_or(|(_, best_gain)| gain > best_gain) {
                attribute_best = Some((threshold, gain));
            }
        }

        let (threshold, gain) = attribute_best.unwrap_or((sorted[0].0, 0.0));
        if best.is_none_or(|(_, _, best_gain)| gain > best_gain) {
            best = Some((attribute, threshold, gain));
        }
    }

    let (attribute, threshold, gain) = best?;

    let column = &columns[attribute];
    let (lesser_indices, greater_equal_indices): (Vec<usize>, Vec<usize>) = sample_indices
        .iter()
        .partition(|&&si| column[si] < threshold);

    Some(SplitResult {
        attribute,
        threshold,
        gain,
        lesser_indices,
        greater_equal_indices,
    })
}

/// Index and count of the majority class among `sample_indices`.
///
/// Ties go to the class that appears first in `sample_indices`.
pub(crate) fn majority_class(labels: &[usize], sample_indices: &[usize]) -> Option<(usize, usize)> {
    majority_by_first_appearance(sample_indices.iter().map(|&si| labels[si]))
}
