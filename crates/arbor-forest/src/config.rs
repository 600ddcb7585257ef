//! Configuration builder for random forest training.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::ForestError;
use crate::forest::{self, RandomForest};
use crate::record::Record;

/// Configuration for random forest training.
///
/// Construct via [`RandomForestConfig::new`], then chain `with_*` methods.
/// Every tree is grown with purity threshold 1.0 and no minimum record count.
///
/// # Defaults
///
/// | Parameter             | Default                 |
/// |-----------------------|-------------------------|
/// | `max_depth`           | `None` (unlimited)      |
/// | `attributes_per_node` | `None` (all attributes) |
/// | `seed`                | 42                      |
#[derive(Debug, Clone)]
pub struct RandomForestConfig {
    pub(crate) n_trees: usize,
    pub(crate) max_depth: Option<usize>,
    pub(crate) attributes_per_node: Option<usize>,
    pub(crate) seed: u64,
}

impl RandomForestConfig {
    /// Create a new config with the given number of trees.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTreeCount`] if `n_trees` is zero.
    pub fn new(n_trees: usize) -> Result<Self, ForestError> {
        if n_trees == 0 {
            return Err(ForestError::InvalidTreeCount { n_trees });
        }
        Ok(Self {
            n_trees,
            max_depth: None,
            attributes_per_node: None,
            seed: 42,
        })
    }

    /// Set the maximum depth of every tree. `None` means unlimited.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the number of attributes drawn at random at each node.
    /// `None` means consider all attributes.
    #[must_use]
    pub fn with_attributes_per_node(mut self, attributes_per_node: Option<usize>) -> Self {
        self.attributes_per_node = attributes_per_node;
        self
    }

    /// Set the random seed for reproducibility.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    // --- Getters ---

    /// Return the number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.n_trees
    }

    /// Return the per-tree depth limit, if any.
    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Return the per-node random attribute count, if set.
    #[must_use]
    pub fn attributes_per_node(&self) -> Option<usize> {
        self.attributes_per_node
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Train a random forest seeded from [`seed`](Self::seed).
    ///
    /// See [`fit_with_rng`](Self::fit_with_rng) for the errors.
    pub fn fit(
        &self,
        dataset: &[Record],
        target_attribute: &str,
    ) -> Result<RandomForest, ForestError> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.fit_with_rng(dataset, target_attribute, &mut rng)
    }

    /// Train a random forest, drawing per-tree seeds from `rng`.
    ///
    /// The result depends only on `rng`, never on the number of worker
    /// threads.
    ///
    /// # Errors
    ///
    /// | Variant                               | When                                    |
    /// |---------------------------------------|-----------------------------------------|
    /// | [`ForestError::EmptyDataset`]         | `dataset` is empty                      |
    /// | [`ForestError::MissingAttribute`]     | a record lacks `target_attribute`       |
    /// | [`ForestError::AttributeSetMismatch`] | records carry different attribute names |
    /// | [`ForestError::NonNumericValue`]      | a non-target attribute holds text       |
    /// | [`ForestError::NonFiniteValue`]       | a non-target attribute is NaN or infinite |
    pub fn fit_with_rng<R: Rng>(
        &self,
        dataset: &[Record],
        target_attribute: &str,
        rng: &mut R,
    ) -> Result<RandomForest, ForestError> {
        forest::train(self, dataset, target_attribute, rng)
    }
}
