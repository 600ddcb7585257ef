use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument, trace};

use crate::{
    ForestError,
    node::{Node, placeholder},
    record::{Record, Value},
    split::{SplitResult, candidate_attributes, find_best_split, majority_class},
};

/// Configuration for a single decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter               | Default               |
/// |-------------------------|-----------------------|
/// | `max_depth`             | `None` (unlimited)    |
/// | `purity_threshold`      | 1.0                   |
/// | `min_examples_to_split` | 0                     |
/// | `num_random_attributes` | `None` (all attributes) |
/// | `seed`                  | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) max_depth: Option<usize>,
    pub(crate) purity_threshold: f64,
    pub(crate) min_examples_to_split: usize,
    pub(crate) num_random_attributes: Option<usize>,
    pub(crate) seed: u64,
}

impl DecisionTreeConfig {
    /// Create a new config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: None,
            purity_threshold: 1.0,
            min_examples_to_split: 0,
            num_random_attributes: None,
            seed: 42,
        }
    }

    /// Set the maximum tree depth.
    ///
    /// `None` means grow until a stopping condition is met. `Some(0)` yields
    /// a single leaf.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the majority-class fraction at which a node becomes a leaf.
    #[must_use]
    pub fn with_purity_threshold(mut self, purity_threshold: f64) -> Self {
        self.purity_threshold = purity_threshold;
        self
    }

    /// Set the record count at or below which a node becomes a leaf.
    #[must_use]
    pub fn with_min_examples_to_split(mut self, min_examples_to_split: usize) -> Self {
        self.min_examples_to_split = min_examples_to_split;
        self
    }

    /// Set the number of attributes drawn at random at each node.
    ///
    /// `None` means consider all attributes. Values above the number of
    /// available attributes are capped.
    #[must_use]
    pub fn with_num_random_attributes(mut self, num_random_attributes: Option<usize>) -> Self {
        self.num_random_attributes = num_random_attributes;
        self
    }

    /// Set the random seed used by [`fit`](Self::fit).
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the maximum depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the purity threshold.
    #[must_use]
    pub fn purity_threshold(&self) -> f64 {
        self.purity_threshold
    }

    /// Return the minimum record count required to split.
    #[must_use]
    pub fn min_examples_to_split(&self) -> usize {
        self.min_examples_to_split
    }

    /// Return the per-node random attribute count, if set.
    #[must_use]
    pub fn num_random_attributes(&self) -> Option<usize> {
        self.num_random_attributes
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a decision tree, drawing randomness from a ChaCha8 RNG seeded
    /// with [`seed`](Self::seed).
    ///
    /// See [`fit_with_rng`](Self::fit_with_rng) for the errors.
    pub fn fit(
        &self,
        dataset: &[Record],
        target_attribute: &str,
        default_class: Value,
    ) -> Result<DecisionTree, ForestError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.fit_with_rng(dataset, target_attribute, default_class, &mut rng)
    }

    /// Train a decision tree using the supplied random number generator.
    ///
    /// Every attribute except `target_attribute` is a splitting candidate.
    /// `default_class` becomes the prediction of a leaf that no training
    /// record reaches; an empty `dataset` therefore yields a single leaf
    /// holding `default_class`.
    ///
    /// # Errors
    ///
    /// | Variant                                 | When                                                 |
    /// |-----------------------------------------|------------------------------------------------------|
    /// | [`ForestError::InvalidPurityThreshold`] | `purity_threshold` is outside [0.0, 1.0]             |
    /// | [`ForestError::MissingAttribute`]       | a record lacks `target_attribute`                    |
    /// | [`ForestError::AttributeSetMismatch`]   | records carry different attribute names              |
    /// | [`ForestError::NonNumericValue`]        | a non-target attribute holds text                    |
    /// | [`ForestError::NonFiniteValue`]         | a non-target attribute is NaN or infinite            |
    #[instrument(
        skip(self, dataset, default_class, rng),
        fields(n_records = dataset.len())
    )]
    pub fn fit_with_rng<R: Rng>(
        &self,
        dataset: &[Record],
        target_attribute: &str,
        default_class: Value,
        rng: &mut R,
    ) -> Result<DecisionTree, ForestError> {
        if !(0.0..=1.0).contains(&self.purity_threshold) {
            return Err(ForestError::InvalidPurityThreshold {
                threshold: self.purity_threshold,
            });
        }

        let data = TrainingData::from_records(dataset, target_attribute)?;

        debug!(
            n_records = dataset.len(),
            n_attributes = data.attributes.len(),
            n_classes = data.classes.len(),
            "fitting decision tree"
        );

        let sample_indices: Vec<usize> = (0..dataset.len()).collect();
        let root = build_tree(
            &data,
            sample_indices,
            &default_class,
            self,
            self.max_depth,
            rng,
        );

        debug!(
            n_nodes = root.n_nodes(),
            depth = root.depth(),
            "decision tree built"
        );

        Ok(DecisionTree {
            root,
            attributes: data.attributes,
        })
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Validated training records in column-major form.
///
/// Class labels are mapped to indices into `classes` in order of first
/// appearance.
#[derive(Debug)]
struct TrainingData {
    attributes: Vec<String>,
    columns: Vec<Vec<f64>>,
    labels: Vec<usize>,
    classes: Vec<Value>,
}

impl TrainingData {
    fn from_records(dataset: &[Record], target_attribute: &str) -> Result<Self, ForestError> {
        let Some(first) = dataset.first() else {
            return Ok(Self {
                attributes: Vec::new(),
                columns: Vec::new(),
                labels: Vec::new(),
                classes: Vec::new(),
            });
        };

        let attributes: Vec<String> = first
            .attributes()
            .filter(|&name| name != target_attribute)
            .map(String::from)
            .collect();

        let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(dataset.len()); attributes.len()];
        let mut labels = Vec::with_capacity(dataset.len());
        let mut classes: Vec<Value> = Vec::new();

        for (record_index, record) in dataset.iter().enumerate() {
            if !record.same_attributes(first) {
                return Err(ForestError::AttributeSetMismatch { record_index });
            }

            let label = record.value(target_attribute)?;
            let class = match classes.iter().position(|c| c == label) {
                Some(idx) => idx,
                None => {
                    classes.push(label.clone());
                    classes.len() - 1
                }
            };
            labels.push(class);

            for (column, attribute) in columns.iter_mut().zip(&attributes) {
                let value = record.number(attribute)?;
                if !value.is_finite() {
                    return Err(ForestError::NonFiniteValue {
                        record_index,
                        attribute: attribute.clone(),
                    });
                }
                column.push(value);
            }
        }

        Ok(Self {
            attributes,
            columns,
            labels,
            classes,
        })
    }
}

/// What to do with the records that reached a node.
enum Expansion {
    Leaf(Value),
    Split {
        predicted_class: Value,
        split: SplitResult,
    },
}

/// Decide whether a node becomes a leaf or splits.
///
/// Candidate attributes are drawn before any stopping check, so every
/// non-empty node consumes exactly one draw.
fn expand(
    data: &TrainingData,
    sample_indices: &[usize],
    default_class: &Value,
    config: &DecisionTreeConfig,
    depth_budget: Option<usize>,
    rng: &mut impl Rng,
) -> Expansion {
    let Some((majority, majority_count)) = majority_class(&data.labels, sample_indices) else {
        return Expansion::Leaf(default_class.clone());
    };

    let candidates = candidate_attributes(
        data.attributes.len(),
        config.num_random_attributes,
        rng,
    );

    let n_samples = sample_indices.len();
    let predicted_class = data.classes[majority].clone();

    // Stopping conditions → leaf.
    let no_candidates = candidates.is_empty();
    let too_few = n_samples <= config.min_examples_to_split;
    let depth_exhausted = depth_budget == Some(0);
    let pure_enough = majority_count as f64 / n_samples as f64 >= config.purity_threshold;

    if no_candidates || too_few || depth_exhausted || pure_enough {
        return Expansion::Leaf(predicted_class);
    }

    let Some(split) = find_best_split(
        &data.columns,
        &data.labels,
        sample_indices,
        data.classes.len(),
        &candidates,
    ) else {
        return Expansion::Leaf(predicted_class);
    };

    // A split that separates nothing would never terminate.
    if split.lesser_indices.is_empty() || split.greater_equal_indices.is_empty() {
        return Expansion::Leaf(predicted_class);
    }

    Expansion::Split {
        predicted_class,
        split,
    }
}

/// Grow the tree over `sample_indices` with an explicit work stack.
///
/// Nodes are expanded depth-first, the lesser subtree before the
/// greater-equal one, so random draws happen in pre-order. Each pending node
/// owns its index partition, which is freed as soon as the node is expanded.
/// `depth_budget` is the remaining depth: `Some(0)` forces a leaf, and each
/// child receives one less.
fn build_tree(
    data: &TrainingData,
    sample_indices: Vec<usize>,
    default_class: &Value,
    config: &DecisionTreeConfig,
    depth_budget: Option<usize>,
    rng: &mut impl Rng,
) -> Node {
    let mut root = Node::leaf(default_class.clone());
    let mut pending: Vec<(&mut Node, Vec<usize>, Option<usize>)> =
        vec![(&mut root, sample_indices, depth_budget)];

    while let Some((slot, sample_indices, depth_budget)) = pending.pop() {
        let (predicted_class, split) =
            match expand(data, &sample_indices, default_class, config, depth_budget, rng) {
                Expansion::Leaf(class) => {
                    *slot = Node::leaf(class);
                    continue;
                }
                Expansion::Split {
                    predicted_class,
                    split,
                } => (predicted_class, split),
            };

        trace!(
            attribute = %data.attributes[split.attribute],
            threshold = split.threshold,
            gain = split.gain,
            n_lesser = split.lesser_indices.len(),
            n_greater_equal = split.greater_equal_indices.len(),
            "split chosen"
        );

        *slot = Node::Internal {
            predicted_class,
            split_attribute: data.attributes[split.attribute].clone(),
            split_threshold: split.threshold,
            lesser_child: placeholder(),
            greater_equal_child: placeholder(),
        };

        let child_budget = depth_budget.map(|d| d - 1);
        if let Node::Internal {
            lesser_child,
            greater_equal_child,
            ..
        } = slot
        {
            pending.push((
                &mut **greater_equal_child,
                split.greater_equal_indices,
                child_budget,
            ));
            pending.push((&mut **lesser_child, split.lesser_indices, child_budget));
        }
    }
    drop(pending);

    root
}

/// A fitted decision tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    pub(crate) root: Node,
    pub(crate) attributes: Vec<String>,
}

impl DecisionTree {
    /// Borrow the root node.
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Consume the tree and return its root node.
    #[must_use]
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Return the splitting attributes seen during training, in name order.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// Predict the class of a single instance.
    ///
    /// # Errors
    ///
    /// See [`Node::predict`].
    pub fn predict(&self, instance: &Record) -> Result<&Value, ForestError> {
        self.root.predict(instance)
    }

    /// Return the total number of nodes in the tree.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.root.n_nodes()
    }

    /// Return the number of leaf nodes.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    /// Return the maximum depth of the tree. A single leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }
}

impl fmt::Display for DecisionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}
