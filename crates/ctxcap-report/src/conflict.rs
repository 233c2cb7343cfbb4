//! Conflict detection over indexed key observations.
//!
//! Observations are compared only within the same normalized key *and* the
//! same key path. A key that appears at two different nesting positions is
//! two unrelated slots.

use std::fmt;

use serde::Serialize;

use ctxcap_merge::{KeyObservation, ObservationIndex};
use ctxcap_types::{KeyPath, SourceId, TypeDescriptor};

/// One spelling of a key as seen in one source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SpellingEntry {
    pub source_id: SourceId,
    pub original_key: String,
}

/// One spelling of a key with the type it held in one source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypedEntry {
    pub source_id: SourceId,
    pub original_key: String,
    pub descriptor: TypeDescriptor,
}

/// A disagreement among observations of the same slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Conflict {
    /// The slot was spelled differently across sources.
    KeySpelling {
        key: String,
        path: KeyPath,
        entries: Vec<SpellingEntry>,
    },
    /// The slot held values of different types (or optional-ness).
    TypeMismatch {
        key: String,
        path: KeyPath,
        entries: Vec<TypedEntry>,
    },
}

impl Conflict {
    /// The normalized key the conflicting observations share.
    pub fn key(&self) -> &str {
        match self {
            Self::KeySpelling { key, .. } | Self::TypeMismatch { key, .. } => key,
        }
    }

    pub fn path(&self) -> &KeyPath {
        match self {
            Self::KeySpelling { path, .. } | Self::TypeMismatch { path, .. } => path,
        }
    }

    /// Sources involved, in capture order.
    pub fn sources(&self) -> Vec<SourceId> {
        match self {
            Self::KeySpelling { entries, .. } => entries.iter().map(|e| e.source_id).collect(),
            Self::TypeMismatch { entries, .. } => entries.iter().map(|e| e.source_id).collect(),
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeySpelling { path, entries, .. } => {
                write!(f, "Key string mismatch (keypath: {path}): [")?;
                for (i, e) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "({}, {:?})", e.source_id, e.original_key)?;
                }
                f.write_str("]")
            }
            Self::TypeMismatch { path, entries, .. } => {
                write!(f, "Value type mismatch (keypath: {path}): [")?;
                for (i, e) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "({}, {:?}, {})", e.source_id, e.original_key, e.descriptor)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// All conflicts found in an observation index.
///
/// Conflicts are ordered by normalized key, then by the first appearance of
/// each path, with a spelling conflict before a type conflict for the same
/// slot. The order is therefore reproducible for a given capture sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConflictReport {
    conflicts: Vec<Conflict>,
}

impl ConflictReport {
    /// Scan every normalized key bucket for disagreeing observations.
    pub fn generate(observations: &ObservationIndex) -> Self {
        let mut conflicts = Vec::new();
        for (key, bucket) in observations.iter() {
            for (path, group) in partition_by_path(bucket) {
                if group.len() < 2 {
                    continue;
                }
                let first = group[0];

                if group.iter().any(|o| o.original_key != first.original_key) {
                    conflicts.push(Conflict::KeySpelling {
                        key: key.clone(),
                        path: path.clone(),
                        entries: group
                            .iter()
                            .map(|o| SpellingEntry {
                                source_id: o.source_id,
                                original_key: o.original_key.clone(),
                            })
                            .collect(),
                    });
                }

                if group.iter().any(|o| o.descriptor != first.descriptor) {
                    conflicts.push(Conflict::TypeMismatch {
                        key: key.clone(),
                        path: path.clone(),
                        entries: group
                            .iter()
                            .map(|o| TypedEntry {
                                source_id: o.source_id,
                                original_key: o.original_key.clone(),
                                descriptor: o.descriptor,
                            })
                            .collect(),
                    });
                }
            }
        }
        Self { conflicts }
    }

    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conflicts.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Conflict> {
        self.conflicts.iter()
    }

    /// Number of key-spelling conflicts.
    pub fn spelling_conflicts(&self) -> usize {
        self.conflicts
            .iter()
            .filter(|c| matches!(c, Conflict::KeySpelling { .. }))
            .count()
    }

    /// Number of value-type conflicts.
    pub fn type_conflicts(&self) -> usize {
        self.conflicts
            .iter()
            .filter(|c| matches!(c, Conflict::TypeMismatch { .. }))
            .count()
    }

    /// Conflicts for `key` at exactly `path`.
    pub fn find<'a>(&'a self, key: &'a str, path: &'a KeyPath) -> impl Iterator<Item = &'a Conflict> {
        self.conflicts
            .iter()
            .filter(move |c| c.key() == key && c.path() == path)
    }
}

impl<'a> IntoIterator for &'a ConflictReport {
    type Item = &'a Conflict;
    type IntoIter = std::slice::Iter<'a, Conflict>;

    fn into_iter(self) -> Self::IntoIter {
        self.conflicts.iter()
    }
}

/// One line per conflict.
impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for conflict in &self.conflicts {
            writeln!(f, "{conflict}")?;
        }
        Ok(())
    }
}

/// Group observations by exact path, keeping first-appearance order.
fn partition_by_path(bucket: &[KeyObservation]) -> Vec<(&KeyPath, Vec<&KeyObservation>)> {
    let mut groups: Vec<(&KeyPath, Vec<&KeyObservation>)> = Vec::new();
    for observation in bucket {
        match groups.iter_mut().find(|(path, _)| **path == observation.path) {
            Some((_, group)) => group.push(observation),
            None => groups.push((&observation.path, vec![observation])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctxcap_merge::{index_document, MergeAccumulator};
    use ctxcap_types::{CapturedDocument, Document, Value, ValueKind};
    use serde_json::json;

    fn captured(v: serde_json::Value) -> CapturedDocument {
        CapturedDocument::new(SourceId::new(), Some(Document::try_from(v).unwrap()))
    }

    fn report_for(docs: &[CapturedDocument], case_sensitive: bool) -> ConflictReport {
        let acc = MergeAccumulator::from_documents(docs, case_sensitive).unwrap();
        ConflictReport::generate(acc.observations())
    }

    #[test]
    fn single_document_has_no_conflicts() {
        let report = report_for(&[captured(json!({"a": 1, "b": {"c": "x"}}))], false);
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "");
    }

    #[test]
    fn agreeing_documents_have_no_conflicts() {
        let report = report_for(
            &[captured(json!({"a": 1, "n": {"x": true}})), captured(json!({"a": 2, "n": {"x": false}}))],
            false,
        );
        assert!(report.is_empty());
    }

    #[test]
    fn spelling_conflict_either_order() {
        for (first, second) in [("A", "a"), ("a", "A")] {
            let d1 = captured(json!({ first: 1 }));
            let d2 = captured(json!({ second: 2 }));
            let report = report_for(&[d1.clone(), d2.clone()], false);

            assert_eq!(report.len(), 1);
            assert_eq!(report.spelling_conflicts(), 1);
            match report.iter().next().unwrap() {
                Conflict::KeySpelling { key, path, entries } => {
                    assert_eq!(key, "a");
                    assert!(path.is_root());
                    assert_eq!(
                        entries,
                        &vec![
                            SpellingEntry { source_id: d1.id, original_key: first.into() },
                            SpellingEntry { source_id: d2.id, original_key: second.into() },
                        ]
                    );
                }
                other => panic!("expected KeySpelling, got {other:?}"),
            }
        }
    }

    #[test]
    fn case_sensitive_spelling_variants_are_separate_slots() {
        let report = report_for(&[captured(json!({"A": 1})), captured(json!({"a": 2}))], true);
        assert!(report.is_empty());
    }

    #[test]
    fn type_conflict_reports_both_descriptors() {
        let s1 = captured(json!({"x": "5"}));
        let s2 = captured(json!({"x": 5}));
        let report = report_for(&[s1.clone(), s2.clone()], true);

        assert_eq!(report.len(), 1);
        assert_eq!(report.type_conflicts(), 1);
        let root = KeyPath::root();
        let conflict = report.find("x", &root).next().unwrap();
        match conflict {
            Conflict::TypeMismatch { entries, .. } => {
                assert_eq!(entries[0].source_id, s1.id);
                assert_eq!(entries[0].descriptor, TypeDescriptor::required(ValueKind::String));
                assert_eq!(entries[1].source_id, s2.id);
                assert_eq!(entries[1].descriptor, TypeDescriptor::required(ValueKind::Integer));
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
        assert_eq!(conflict.sources(), vec![s1.id, s2.id]);
    }

    #[test]
    fn optional_and_required_of_same_type_conflict() {
        let mut d = Document::new();
        d.insert("n", Value::typed_null(ValueKind::Integer));
        let report = report_for(
            &[captured(json!({"n": 1})), CapturedDocument::new(SourceId::new(), Some(d))],
            true,
        );
        assert_eq!(report.type_conflicts(), 1);
    }

    #[test]
    fn spelling_and_type_conflict_on_same_slot() {
        let report = report_for(&[captured(json!({"Id": "7"})), captured(json!({"id": 7}))], false);
        assert_eq!(report.len(), 2);
        let kinds: Vec<bool> = report.iter().map(|c| matches!(c, Conflict::KeySpelling { .. })).collect();
        assert_eq!(kinds, vec![true, false]);
    }

    #[test]
    fn same_key_under_different_parents_is_not_compared() {
        let report = report_for(&[captured(json!({"a": {"k": 1}})), captured(json!({"b": {"k": "x"}}))], true);
        assert!(report.is_empty());
    }

    #[test]
    fn nested_conflict_reports_path() {
        let report = report_for(
            &[captured(json!({"ctx": {"Page": "home"}})), captured(json!({"CTX": {"page": "cart"}}))],
            false,
        );
        let paths: Vec<String> = report.iter().map(|c| c.path().to_string()).collect();
        assert_eq!(paths, vec![r#"[]"#.to_string(), r#"["ctx"]"#.to_string()]);
    }

    #[test]
    fn duplicate_case_variants_in_one_document_conflict() {
        let index = index_document(
            &Document::try_from(json!({"Key": 1, "key": 2})).unwrap(),
            SourceId::new(),
            false,
            &KeyPath::root(),
        );
        let report = ConflictReport::generate(&index);
        assert_eq!(report.spelling_conflicts(), 1);
    }

    #[test]
    fn display_lines() {
        let s1 = captured(json!({"x": "5"}));
        let s2 = captured(json!({"X": 5}));
        let report = report_for(&[s1.clone(), s2.clone()], false);
        let text = report.to_string();
        assert!(text.contains(&format!(
            "Key string mismatch (keypath: []): [({}, \"x\"), ({}, \"X\")]",
            s1.id, s2.id
        )));
        assert!(text.contains(&format!(
            "Value type mismatch (keypath: []): [({}, \"x\", string), ({}, \"X\", integer)]",
            s1.id, s2.id
        )));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn generation_is_deterministic() {
        let docs = vec![
            captured(json!({"b": 1, "a": {"z": "s"}})),
            captured(json!({"B": "1", "A": {"Z": 2}})),
        ];
        let first = report_for(&docs, false);
        let second = report_for(&docs, false);
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let report = report_for(&[captured(json!({"A": 1})), captured(json!({"a": 1}))], false);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json[0]["kind"], "key_spelling");
        assert_eq!(json[0]["key"], "a");
        assert_eq!(json[0]["path"], json!([]));
    }
}
