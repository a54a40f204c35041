use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single dimension value. Counts ride along as numbers (e.g. the
/// additions/deletions on a code-volume metric); everything else is a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DimensionValue {
    Str(String),
    Num(f64),
}

impl DimensionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DimensionValue::Str(s) => Some(s),
            DimensionValue::Num(_) => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            DimensionValue::Num(n) => Some(*n),
            DimensionValue::Str(_) => None,
        }
    }
}

impl fmt::Display for DimensionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionValue::Str(s) => write!(f, "{s}"),
            DimensionValue::Num(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for DimensionValue {
    fn from(s: &str) -> Self {
        DimensionValue::Str(s.to_string())
    }
}

impl From<String> for DimensionValue {
    fn from(s: String) -> Self {
        DimensionValue::Str(s)
    }
}

impl From<f64> for DimensionValue {
    fn from(n: f64) -> Self {
        DimensionValue::Num(n)
    }
}

impl From<u64> for DimensionValue {
    fn from(n: u64) -> Self {
        DimensionValue::Num(n as f64)
    }
}

/// Ordered string-keyed dimension set attached to a metric observation.
///
/// Keys are always plain strings, normalized once at construction. The
/// BTreeMap keeps iteration deterministic so cache keys and serialized
/// forms are stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dimensions(BTreeMap<String, DimensionValue>);

impl Dimensions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<DimensionValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<DimensionValue>) {
        self.0.insert(key.into().trim().to_string(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&DimensionValue> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn get_num(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(|v| v.as_num())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &DimensionValue)> {
        self.0.iter()
    }

    /// Subset containment: every key-value pair of `query` is present here.
    /// An empty query matches everything.
    pub fn contains(&self, query: &Dimensions) -> bool {
        query
            .0
            .iter()
            .all(|(k, v)| self.0.get(k).map(|own| own == v).unwrap_or(false))
    }

    /// Exact two-way match, used when locating a pre-existing aggregate row.
    pub fn matches_exactly(&self, other: &Dimensions) -> bool {
        self.0 == other.0
    }
}

impl FromIterator<(String, DimensionValue)> for Dimensions {
    fn from_iter<T: IntoIterator<Item = (String, DimensionValue)>>(iter: T) -> Self {
        let mut dims = Dimensions::new();
        for (k, v) in iter {
            dims.insert(k, v);
        }
        dims
    }
}
