//! Recursive document merge.
//!
//! The incoming side always wins on leaves. Nested documents present on both
//! sides are merged recursively with the same case policy. Lists are leaves
//! and are replaced wholesale.

use tracing::trace;

use ctxcap_types::{Document, Value};

use crate::index::normalize_key;

/// Merge `incoming` into `base` and return the result.
///
/// Absent (`Null`) incoming values are skipped: they leave `base` untouched.
///
/// With `case_sensitive == false`, keys of `base` that match an incoming key
/// case-insensitively collapse into a single entry. Among the matching keys
/// the byte-wise greatest is kept as the survivor, every other match is
/// dropped, and the survivor is re-keyed to the incoming spelling at its
/// original position.
pub fn deep_merge(mut base: Document, incoming: &Document, case_sensitive: bool) -> Document {
    for (key, value) in incoming {
        if value.is_null() {
            continue;
        }
        if case_sensitive {
            merge_exact(&mut base, key, value);
        } else {
            merge_folded(&mut base, key, value);
        }
    }
    base
}

fn merge_exact(base: &mut Document, key: &str, incoming: &Value) {
    if let (Some(Value::Document(existing)), Value::Document(nested)) = (base.get_mut(key), incoming) {
        let current = std::mem::take(existing);
        *existing = deep_merge(current, nested, true);
        return;
    }
    base.insert(key, incoming.clone());
}

// TODO: the survivor is picked by byte order of the keys already present, so
// the surviving casing depends on merge order. Revisit once report consumers
// agree on a stable casing rule; until then this exact tie-break is relied on.
fn merge_folded(base: &mut Document, key: &str, incoming: &Value) {
    let needle = normalize_key(key, false);
    let mut matches: Vec<String> = base
        .keys()
        .filter(|existing| normalize_key(existing, false) == needle)
        .cloned()
        .collect();

    let Some(survivor) = matches.iter().max().cloned() else {
        base.insert(key, incoming.clone());
        return;
    };
    matches.retain(|k| *k != survivor);

    for dropped in &matches {
        base.remove(dropped);
    }
    if !matches.is_empty() || survivor != key {
        trace!(
            incoming = key,
            survivor = %survivor,
            dropped = matches.len(),
            "case-insensitive key collision"
        );
    }

    let position = base.index_of(&survivor).unwrap_or(base.len());
    let merged = match (base.remove(&survivor), incoming) {
        (Some(Value::Document(existing)), Value::Document(nested)) => {
            Value::Document(deep_merge(existing, nested, false))
        }
        _ => incoming.clone(),
    };
    base.insert_at(position, key, merged);
}
