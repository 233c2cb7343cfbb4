//! Key-observation indexing.
//!
//! Walks a document recursively and records one [`KeyObservation`] per key
//! per nesting level. Observations are bucketed by normalized key so that
//! spellings which collide under the active case policy land together.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Serialize;

use ctxcap_types::{Document, KeyPath, SourceId, TypeDescriptor, Value};

/// A single sighting of a key in a captured document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct KeyObservation {
    /// The document the key was seen in.
    pub source_id: SourceId,
    /// The key exactly as spelled in the source document.
    pub original_key: String,
    /// Type of the value held under the key.
    pub descriptor: TypeDescriptor,
    /// Normalized keys leading to the level holding this key.
    pub path: KeyPath,
}

/// Observations grouped by normalized key.
///
/// Keys iterate in sorted order and each bucket keeps insertion order, so
/// any traversal of the index is deterministic for a given capture sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObservationIndex {
    buckets: BTreeMap<String, Vec<KeyObservation>>,
}

impl ObservationIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an observation under `normalized_key`.
    pub fn push(&mut self, normalized_key: impl Into<String>, observation: KeyObservation) {
        self.buckets
            .entry(normalized_key.into())
            .or_default()
            .push(observation);
    }

    /// Append every bucket of `other` after the observations already held.
    pub fn absorb(&mut self, other: ObservationIndex) {
        for (key, observations) in other.buckets {
            self.buckets.entry(key).or_default().extend(observations);
        }
    }

    pub fn get(&self, normalized_key: &str) -> Option<&[KeyObservation]> {
        self.buckets.get(normalized_key).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &[KeyObservation])> {
        self.buckets.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Number of distinct normalized keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Total number of observations across all buckets.
    pub fn observation_count(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }
}

/// Normalize a key for matching: unchanged when case sensitive, lower-cased
/// otherwise.
pub fn normalize_key(key: &str, case_sensitive: bool) -> Cow<'_, str> {
    if case_sensitive {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(key.to_lowercase())
    }
}

/// Index every key of `document`, at every nesting level below `path`.
///
/// Each key yields exactly one observation. Nested documents are descended
/// with `path` extended by the normalized key, so a key's position is always
/// expressed in the same normalized form used for bucketing.
pub fn index_document(
    document: &Document,
    source_id: SourceId,
    case_sensitive: bool,
    path: &KeyPath,
) -> ObservationIndex {
    let mut index = ObservationIndex::new();
    index_into(&mut index, document, source_id, case_sensitive, path);
    index
}

fn index_into(
    index: &mut ObservationIndex,
    document: &Document,
    source_id: SourceId,
    case_sensitive: bool,
    path: &KeyPath,
) {
    for (key, value) in document {
        let normalized = normalize_key(key, case_sensitive);
        index.push(
            &*normalized,
            KeyObservation {
                source_id,
                original_key: key.clone(),
                descriptor: TypeDescriptor::of(value),
                path: path.clone(),
            },
        );

        if let Value::Document(child) = value {
            let child_path = path.child(normalized.into_owned());
            index_into(index, child, source_id, case_sensitive, &child_path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxcap_types::{TypeName, ValueKind};
    use proptest::prelude::*;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Document {
        Document::try_from(v).unwrap()
    }

    fn count_keys(document: &Document) -> usize {
        document
            .iter()
            .map(|(_, v)| 1 + v.as_document().map_or(0, count_keys))
            .sum()
    }

    #[test]
    fn normalize_respects_policy() {
        assert_eq!(normalize_key("UserName", true), "UserName");
        assert_eq!(normalize_key("UserName", false), "username");
    }

    #[test]
    fn flat_document() {
        let id = SourceId::new();
        let index = index_document(&doc(json!({"a": 1, "b": "x"})), id, true, &KeyPath::root());

        assert_eq!(index.len(), 2);
        let a = &index.get("a").unwrap()[0];
        assert_eq!(a.source_id, id);
        assert_eq!(a.original_key, "a");
        assert_eq!(a.descriptor, TypeDescriptor::required(ValueKind::Integer));
        assert!(a.path.is_root());
    }

    #[test]
    fn nested_keys_carry_normalized_path() {
        let id = SourceId::new();
        let index = index_document(
            &doc(json!({"Outer": {"Inner": {"Leaf": true}}})),
            id,
            false,
            &KeyPath::root(),
        );

        let outer = &index.get("outer").unwrap()[0];
        assert_eq!(outer.original_key, "Outer");
        assert_eq!(outer.descriptor, TypeDescriptor::required(ValueKind::Document));

        let leaf = &index.get("leaf").unwrap()[0];
        assert_eq!(leaf.original_key, "Leaf");
        assert_eq!(leaf.path.segments(), ["outer", "inner"]);
    }

    #[test]
    fn case_variants_share_a_bucket() {
        let id = SourceId::new();
        let index = index_document(&doc(json!({"Key": 1, "key": 2})), id, false, &KeyPath::root());
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("key").unwrap().len(), 2);

        let index = index_document(&doc(json!({"Key": 1, "key": 2})), id, true, &KeyPath::root());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn same_key_at_different_levels() {
        let id = SourceId::new();
        let index = index_document(
            &doc(json!({"k": 1, "a": {"k": 2}})),
            id,
            true,
            &KeyPath::root(),
        );
        let ks = index.get("k").unwrap();
        assert_eq!(ks.len(), 2);
        assert_ne!(ks[0].path, ks[1].path);
    }

    #[test]
    fn absent_values_are_indexed() {
        let mut d = Document::new();
        d.insert("gone", Value::null());
        d.insert("typed", Value::typed_null(ValueKind::String));

        let index = index_document(&d, SourceId::new(), true, &KeyPath::root());
        let gone = &index.get("gone").unwrap()[0];
        assert!(gone.descriptor.is_optional);
        assert_eq!(gone.descriptor.type_name, TypeName::Unknown);
        assert_eq!(
            index.get("typed").unwrap()[0].descriptor,
            TypeDescriptor::optional(ValueKind::String)
        );
    }

    #[test]
    fn lists_are_leaves() {
        let index = index_document(
            &doc(json!({"items": [{"hidden": 1}]})),
            SourceId::new(),
            true,
            &KeyPath::root(),
        );
        assert_eq!(index.observation_count(), 1);
        assert!(index.get("hidden").is_none());
    }

    #[test]
    fn starting_path_is_honored() {
        let start: KeyPath = ["data"].into_iter().collect();
        let index = index_document(&doc(json!({"x": 1})), SourceId::new(), true, &start);
        assert_eq!(index.get("x").unwrap()[0].path, start);
    }

    #[test]
    fn absorb_appends_in_order() {
        let first = SourceId::new();
        let second = SourceId::new();
        let mut index = index_document(&doc(json!({"x": 1})), first, true, &KeyPath::root());
        index.absorb(index_document(&doc(json!({"x": "1", "y": 2})), second, true, &KeyPath::root()));

        let xs = index.get("x").unwrap();
        assert_eq!(xs[0].source_id, first);
        assert_eq!(xs[1].source_id, second);
        assert_eq!(index.observation_count(), 3);
    }

    fn arb_document() -> impl Strategy<Value = Document> {
        let leaf = prop_oneof![
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(Value::Integer),
            "[a-z]{0,4}".prop_map(Value::String),
            Just(Value::null()),
        ];
        let value = leaf.prop_recursive(3, 24, 4, |inner| {
            prop::collection::btree_map("[a-zA-Z]{1,3}", inner, 0..4)
                .prop_map(|m| Value::Document(m.into_iter().collect()))
        });
        prop::collection::btree_map("[a-zA-Z]{1,3}", value, 0..5)
            .prop_map(|m| m.into_iter().collect())
    }

    proptest! {
        #[test]
        fn one_observation_per_key_per_level(d in arb_document(), case_sensitive in any::<bool>()) {
            let index = index_document(&d, SourceId::new(), case_sensitive, &KeyPath::root());
            prop_assert_eq!(index.observation_count(), count_keys(&d));
        }

        #[test]
        fn no_position_is_duplicated(d in arb_document()) {
            let index = index_document(&d, SourceId::new(), true, &KeyPath::root());
            let mut seen = std::collections::HashSet::new();
            for (_, observations) in index.iter() {
                for o in observations {
                    prop_assert!(seen.insert((o.path.clone(), o.original_key.clone())));
                }
            }
        }
    }
}
