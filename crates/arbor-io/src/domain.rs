//! Domain types for arbor-io.

use arbor_forest::Record;

/// A labelled dataset read from CSV.
///
/// Produced by [`DatasetReader`](crate::DatasetReader). Every record holds
/// one `Value::Number` per attribute column and a `Value::Text` under the
/// target column.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Column names in file order, target included.
    column_names: Vec<String>,
    /// Name of the target column.
    target: String,
    /// Records in file order.
    records: Vec<Record>,
}

impl Dataset {
    pub(crate) fn new(column_names: Vec<String>, target: String, records: Vec<Record>) -> Self {
        Self {
            column_names,
            target,
            records,
        }
    }

    /// Return the records in file order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Consume the dataset and return its records.
    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Return the column names in file order, target included.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Return the attribute column names, target excluded.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.column_names
            .iter()
            .map(String::as_str)
            .filter(|&name| name != self.target)
    }

    /// Return the target column name.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Return the number of records.
    #[must_use]
    pub fn n_records(&self) -> usize {
        self.records.len()
    }
}
