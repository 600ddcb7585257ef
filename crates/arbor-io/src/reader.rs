//! CSV dataset reader with full input validation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use arbor_forest::{Record, Value};
use tracing::{debug, info, instrument};

use crate::domain::Dataset;
use crate::IoError;

/// Reads a labelled dataset from a delimited text file.
///
/// Every column except the target must hold finite numbers; the target
/// column is kept as text. Surrounding whitespace is trimmed from every
/// field.
///
/// # Defaults
///
/// | Parameter      | Default                 |
/// |----------------|-------------------------|
/// | `delimiter`    | `b','`                  |
/// | `column_names` | `None` (header row)     |
/// | `target`       | `"class"`               |
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`IoError::FileNotFound`] | File doesn't exist or is unreadable |
/// | [`IoError::CsvParse`] | Malformed CSV record |
/// | [`IoError::DuplicateColumn`] | Two columns share a name |
/// | [`IoError::UnknownTarget`] | Target is not among the columns |
/// | [`IoError::NoFeatureColumns`] | Target is the only column |
/// | [`IoError::InconsistentRowLength`] | Row has a different column count |
/// | [`IoError::NonFiniteValue`] | Attribute cell is NaN, Inf, or unparseable |
/// | [`IoError::EmptyDataset`] | Zero data rows |
#[derive(Debug, Clone)]
pub struct DatasetReader {
    path: PathBuf,
    delimiter: u8,
    column_names: Option<Vec<String>>,
    target: String,
}

impl DatasetReader {
    /// Create a new reader for the given file path.
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            delimiter: b',',
            column_names: None,
            target: "class".to_string(),
        }
    }

    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Supply column names for a file without a header row.
    #[must_use]
    pub fn with_column_names(mut self, column_names: Vec<String>) -> Self {
        self.column_names = Some(column_names);
        self
    }

    /// Set the name of the target column.
    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    fn csv_error(&self, e: csv::Error) -> IoError {
        IoError::CsvParse {
            path: self.path.clone(),
            offset: e.position().map_or(0, |p| p.byte()),
            source: e,
        }
    }

    /// Check column names and return the target's position.
    fn validate_columns(&self, column_names: &[String]) -> Result<usize, IoError> {
        let mut seen = HashSet::new();
        for name in column_names {
            if !seen.insert(name.as_str()) {
                return Err(IoError::DuplicateColumn {
                    path: self.path.clone(),
                    column: name.clone(),
                });
            }
        }

        let target_index = column_names
            .iter()
            .position(|name| *name == self.target)
            .ok_or_else(|| IoError::UnknownTarget {
                path: self.path.clone(),
                target: self.target.clone(),
            })?;

        if column_names.len() < 2 {
            return Err(IoError::NoFeatureColumns {
                path: self.path.clone(),
            });
        }
        Ok(target_index)
    }

    /// Read and validate the file, returning a [`Dataset`].
    #[instrument(skip(self), fields(path = %self.path.display(), target = %self.target))]
    pub fn read(&self) -> Result<Dataset, IoError> {
        let file = std::fs::File::open(&self.path).map_err(|e| IoError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        // flexible(true) lets the InconsistentRowLength check below fire
        // instead of a low-level CsvParse error.
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.column_names.is_none())
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(file);

        let column_names: Vec<String> = match &self.column_names {
            Some(names) => names.iter().map(|n| n.trim().to_string()).collect(),
            None => rdr
                .headers()
                .map_err(|e| self.csv_error(e))?
                .iter()
                .map(String::from)
                .collect(),
        };
        let target_index = self.validate_columns(&column_names)?;
        debug!(n_columns = column_names.len(), target_index, "resolved columns");

        let mut records = Vec::new();
        for (row_index, result) in rdr.records().enumerate() {
            let row = result.map_err(|e| self.csv_error(e))?;

            if row.len() != column_names.len() {
                return Err(IoError::InconsistentRowLength {
                    path: self.path.clone(),
                    row_index,
                    expected: column_names.len(),
                    got: row.len(),
                });
            }

            let mut record = Record::new();
            for (col_index, (name, raw)) in column_names.iter().zip(row.iter()).enumerate() {
                if col_index == target_index {
                    record.insert(name.as_str(), Value::Text(raw.to_string()));
                    continue;
                }
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| IoError::NonFiniteValue {
                        path: self.path.clone(),
                        row_index,
                        column: name.clone(),
                        raw: raw.to_string(),
                    })?;
                record.insert(name.as_str(), Value::Number(value));
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(IoError::EmptyDataset {
                path: self.path.clone(),
            });
        }

        info!(
            n_records = records.len(),
            n_attributes = column_names.len() - 1,
            "dataset loaded"
        );

        Ok(Dataset::new(column_names, self.target.clone(), records))
    }
}
