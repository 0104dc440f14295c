use serde::{Deserialize, Serialize};

use crate::types::Value;

/// Canonical value of a control: a dense, ordered list of deltas.
///
/// Delta indices are implicit and always contiguous from 0. An entry is
/// normally a record (`Value::Map` of child name -> value), but shapes the
/// normalizer passes through untouched are kept as they came.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeltaList(Vec<Value>);

impl DeltaList {
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, delta: usize) -> Option<&Value> {
        self.0.get(delta)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// Keeps the first `len` deltas.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// Removes the delta at `delta`, shifting later deltas down by one.
    /// Returns `None` when the index is past the end.
    pub fn remove(&mut self, delta: usize) -> Option<Value> {
        (delta < self.0.len()).then(|| self.0.remove(delta))
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }

    /// The list as a `Value::Array`, the shape used in cleaned submissions.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Array(self.0)
    }
}

impl From<Vec<Value>> for DeltaList {
    fn from(deltas: Vec<Value>) -> Self {
        Self(deltas)
    }
}

impl FromIterator<Value> for DeltaList {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for DeltaList {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a DeltaList {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
