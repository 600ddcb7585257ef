/// Errors from decision tree and random forest operations.
#[derive(Debug, thiserror::Error)]
pub enum ForestError {
    /// Returned when an operation needs at least one record and got none.
    #[error("dataset has zero records")]
    EmptyDataset,

    /// Returned when a record or instance lacks an attribute the operation needs.
    #[error("missing attribute \"{attribute}\"")]
    MissingAttribute {
        /// Name of the attribute that could not be found.
        attribute: String,
    },

    /// Returned when a splitting attribute holds a text value.
    #[error("attribute \"{attribute}\" is not numeric")]
    NonNumericValue {
        /// Name of the offending attribute.
        attribute: String,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at record {record_index}, attribute \"{attribute}\"")]
    NonFiniteValue {
        /// The zero-based index of the offending record.
        record_index: usize,
        /// Name of the offending attribute.
        attribute: String,
    },

    /// Returned when a training record does not share the first record's keys.
    #[error("record {record_index} has a different attribute set than record 0")]
    AttributeSetMismatch {
        /// The zero-based index of the offending record.
        record_index: usize,
    },

    /// Returned when purity_threshold is not in [0.0, 1.0].
    #[error("purity_threshold must be in [0.0, 1.0], got {threshold}")]
    InvalidPurityThreshold {
        /// The invalid threshold provided.
        threshold: f64,
    },

    /// Returned when n_trees is zero.
    #[error("n_trees must be at least 1, got {n_trees}")]
    InvalidTreeCount {
        /// The invalid n_trees value provided.
        n_trees: usize,
    },

    /// Returned when a holdout train fraction is not in (0.0, 1.0).
    #[error("train_fraction must be in (0.0, 1.0), got {fraction}")]
    InvalidTrainFraction {
        /// The invalid fraction provided.
        fraction: f64,
    },
}
