//! Absent-field elision.

use std::collections::BTreeMap;

/// Copy `fields` without the entries whose value is absent. Empty strings,
/// zero and `false` are present values and are kept.
pub fn reject_null<V: Clone>(fields: &BTreeMap<String, Option<V>>) -> BTreeMap<String, V> {
    fields
        .iter()
        .filter_map(|(key, value)| value.as_ref().map(|v| (key.clone(), v.clone())))
        .collect()
}
