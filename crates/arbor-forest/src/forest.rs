//! Random forest training with parallel tree construction.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use tracing::{debug, info, instrument};

use crate::config::RandomForestConfig;
use crate::error::ForestError;
use crate::record::Record;
use crate::tree::{DecisionTree, DecisionTreeConfig};
use crate::vote::majority_label;

/// A fitted random forest ensemble.
#[derive(Debug, Clone)]
pub struct RandomForest {
    pub(crate) trees: Vec<DecisionTree>,
}

/// Draw `len(dataset)` records uniformly with replacement.
fn bootstrap_sample(dataset: &[Record], rng: &mut impl Rng) -> Vec<Record> {
    let n_records = dataset.len();
    (0..n_records)
        .map(|_| dataset[rng.gen_range(0..n_records)].clone())
        .collect()
}

/// Train the random forest ensemble.
#[instrument(skip_all, fields(n_trees = config.n_trees, n_records = dataset.len()))]
pub(crate) fn train<R: Rng>(
    config: &RandomForestConfig,
    dataset: &[Record],
    target_attribute: &str,
    rng: &mut R,
) -> Result<RandomForest, ForestError> {
    if dataset.is_empty() {
        return Err(ForestError::EmptyDataset);
    }
    let default_class = majority_label(dataset, target_attribute)?;

    info!(
        n_trees = config.n_trees,
        n_records = dataset.len(),
        max_depth = ?config.max_depth,
        attributes_per_node = ?config.attributes_per_node,
        default_class = %default_class,
        "training random forest"
    );

    // Seeds are drawn up front so the result does not depend on scheduling.
    let tree_seeds: Vec<u64> = (0..config.n_trees).map(|_| rng.r#gen()).collect();

    let tree_config = DecisionTreeConfig::new()
        .with_max_depth(config.max_depth)
        .with_num_random_attributes(config.attributes_per_node);

    let trees = tree_seeds
        .into_par_iter()
        .map(|seed| {
            let mut tree_rng = ChaCha8Rng::seed_from_u64(seed);
            let sample = bootstrap_sample(dataset, &mut tree_rng);
            tree_config.fit_with_rng(
                &sample,
                target_attribute,
                default_class.clone(),
                &mut tree_rng,
            )
        })
        .collect::<Result<Vec<DecisionTree>, ForestError>>()?;

    debug!(n_trees_trained = trees.len(), "tree training complete");

    Ok(RandomForest { trees })
}
