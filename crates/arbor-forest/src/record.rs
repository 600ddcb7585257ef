//! In-memory records: attribute name to value mappings.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::error::ForestError;

/// A single cell of a [`Record`].
///
/// Splitting attributes must hold [`Value::Number`]. The target attribute may
/// hold either variant, so `Value` is totally ordered and hashable: numbers
/// compare by IEEE 754 total order and sort before all text.
#[derive(Debug, Clone)]
pub enum Value {
    /// A numeric value.
    Number(f64),
    /// A textual value, typically a class label.
    Text(String),
}

impl Value {
    /// Return the numeric payload, if any.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(x) => Some(*x),
            Value::Text(_) => None,
        }
    }

    /// Return the textual payload, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Number(_) => None,
            Value::Text(s) => Some(s),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(b),
            (Value::Number(_), Value::Text(_)) => Ordering::Less,
            (Value::Text(_), Value::Number(_)) => Ordering::Greater,
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
        }
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // total_cmp equality is bitwise equality, so hashing the bits agrees with Eq.
        match self {
            Value::Number(x) => {
                0u8.hash(state);
                x.to_bits().hash(state);
            }
            Value::Text(s) => {
                1u8.hash(state);
                s.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Number(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

/// A mapping from attribute name to [`Value`].
///
/// Attributes iterate in ascending name order. Training uses this order as
/// the candidate attribute order, which decides ties between equally good
/// splits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an attribute, returning the record for chaining.
    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(attribute, value);
        self
    }

    /// Add or replace an attribute, returning the previous value.
    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(attribute.into(), value.into())
    }

    /// Look up an attribute.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&Value> {
        self.values.get(attribute)
    }

    /// Look up an attribute, failing when it is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ForestError::MissingAttribute`] when `attribute` is absent.
    pub fn value(&self, attribute: &str) -> Result<&Value, ForestError> {
        self.values
            .get(attribute)
            .ok_or_else(|| ForestError::MissingAttribute {
                attribute: attribute.to_string(),
            })
    }

    /// Look up a numeric attribute.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`ForestError::MissingAttribute`] | `attribute` is absent |
    /// | [`ForestError::NonNumericValue`] | `attribute` holds text |
    pub fn number(&self, attribute: &str) -> Result<f64, ForestError> {
        self.value(attribute)?
            .as_number()
            .ok_or_else(|| ForestError::NonNumericValue {
                attribute: attribute.to_string(),
            })
    }

    /// Iterate over attribute names in ascending order.
    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs in ascending name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.values.iter()
    }

    /// Return the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return `true` if the record has no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Return `true` if both records carry exactly the same attribute names.
    pub(crate) fn same_attributes(&self, other: &Record) -> bool {
        self.values.len() == other.values.len()
            && self.values.keys().eq(other.values.keys())
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
