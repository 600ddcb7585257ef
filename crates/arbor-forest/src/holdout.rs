//! Seeded train/test holdout split.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::error::ForestError;
use crate::record::Record;

/// Holdout split configuration.
///
/// Construct via [`HoldoutSplit::new`], then chain `with_seed` if desired.
#[derive(Debug, Clone)]
pub struct HoldoutSplit {
    train_fraction: f64,
    seed: u64,
}

impl HoldoutSplit {
    /// Create a split that keeps `train_fraction` of the records for training.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::InvalidTrainFraction`] unless
    /// `0.0 < train_fraction < 1.0`.
    pub fn new(train_fraction: f64) -> Result<Self, ForestError> {
        if !(train_fraction > 0.0 && train_fraction < 1.0) {
            return Err(ForestError::InvalidTrainFraction {
                fraction: train_fraction,
            });
        }
        Ok(Self {
            train_fraction,
            seed: 42,
        })
    }

    /// Set the random seed for shuffling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Return the training fraction.
    #[must_use]
    pub fn train_fraction(&self) -> f64 {
        self.train_fraction
    }

    /// Return the random seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle a copy of `dataset` and cut it into `(train, test)`.
    ///
    /// The training set holds the first `floor(train_fraction * len)`
    /// shuffled records; the test set holds the rest.
    #[instrument(skip_all, fields(n_records = dataset.len()))]
    pub fn split(&self, dataset: &[Record]) -> (Vec<Record>, Vec<Record>) {
        let mut shuffled = dataset.to_vec();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        shuffled.shuffle(&mut rng);

        let n_train = (self.train_fraction * dataset.len() as f64).floor() as usize;
        let test = shuffled.split_off(n_train);

        debug!(n_train = shuffled.len(), n_test = test.len(), "holdout split");
        (shuffled, test)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<Record> {
        (0..n).map(|i| Record::new().with("i", i as f64)).collect()
    }

    #[test]
    fn rejects_out_of_range_fraction() {
        for fraction in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            assert!(
                matches!(
                    HoldoutSplit::new(fraction),
                    Err(ForestError::InvalidTrainFraction { .. })
                ),
                "fraction {fraction} accepted"
            );
        }
    }

    #[test]
    fn sizes_floor_train_fraction() {
        let (train, test) = HoldoutSplit::new(0.8).unwrap().split(&numbered(11));
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 3);
    }

    #[test]
    fn partitions_every_record_once() {
        let dataset = numbered(25);
        let (train, test) = HoldoutSplit::new(0.6).unwrap().with_seed(3).split(&dataset);
        let mut seen: Vec<usize> = train
            .iter()
            .chain(&test)
            .map(|r| r.number("i").unwrap() as usize)
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn same_seed_same_split() {
        let dataset = numbered(30);
        let split = HoldoutSplit::new(0.5).unwrap().with_seed(7);
        assert_eq!(split.split(&dataset), split.split(&dataset));
    }

    #[test]
    fn empty_dataset_gives_empty_halves() {
        let (train, test) = HoldoutSplit::new(0.8).unwrap().split(&[]);
        assert!(train.is_empty());
        assert!(test.is_empty());
    }
}
