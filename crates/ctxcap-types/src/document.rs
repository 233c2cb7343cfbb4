//! Insertion-ordered documents.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::value::Value;

/// An ordered mapping from string keys to values.
///
/// Iteration follows insertion order. Equality is structural and does not
/// depend on order, so two documents holding the same entries compare equal
/// regardless of how they were built.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(IndexMap<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self(IndexMap::with_capacity(capacity))
    }

    /// Parse a document from JSON text. The top level must be an object.
    pub fn from_json_str(text: &str) -> TypeResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| TypeError::Serialization(e.to_string()))?;
        match value {
            Value::Document(doc) => Ok(doc),
            other => Err(TypeError::NotADocument(
                other
                    .kind()
                    .map_or_else(|| "null".to_string(), |k| k.to_string()),
            )),
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Position of `key` in iteration order.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.0.get_index_of(key)
    }

    /// Insert or overwrite `key`. An existing key keeps its position; a new
    /// key is appended.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Insert `key` at `index`, shifting later entries. An existing key is
    /// moved to `index`.
    pub fn insert_at(&mut self, index: usize, key: impl Into<String>, value: Value) -> Option<Value> {
        let index = index.min(self.0.len());
        self.0.shift_insert(index, key.into(), value)
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Pretty-printed JSON text of this document.
    pub fn to_pretty_json(&self) -> TypeResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| TypeError::Serialization(e.to_string()))
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl TryFrom<serde_json::Value> for Document {
    type Error = TypeError;

    fn try_from(json: serde_json::Value) -> TypeResult<Self> {
        match Value::from(json) {
            Value::Document(doc) => Ok(doc),
            other => Err(TypeError::NotADocument(
                other
                    .kind()
                    .map_or_else(|| "null".to_string(), |k| k.to_string()),
            )),
        }
    }
}
