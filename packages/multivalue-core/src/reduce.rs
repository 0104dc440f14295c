//! Submission cleanup: drops deltas the user left blank.
//!
//! A delta survives when at least one of its leaves holds a value. What
//! counts as blank depends on the child's [`FieldKind`]: text-like fields are
//! blank only for `null` and `""`, checkbox fields also for their unchecked
//! sentinel. Nested repeatable groups are normalized and reduced first, so a
//! parent delta whose only content is an all-blank nested group is itself
//! blank.

use crate::delta::DeltaList;
use crate::normalize::{normalize, RawInput};
use crate::template::{FieldKind, Template};
use crate::types::Value;

/// Removes blank deltas and reindexes the survivors, recursing into nested
/// groups. Applying it twice gives the same result as applying it once.
#[must_use]
pub fn reduce_submission(template: &Template, values: DeltaList) -> DeltaList {
    values
        .into_iter()
        .map(|entry| reduce_nested(template, entry))
        .filter(|entry| !is_empty_delta(template, entry))
        .collect()
}

/// Whether every leaf of `entry` is blank for the child it belongs to.
#[must_use]
pub fn is_empty_delta(template: &Template, entry: &Value) -> bool {
    let Value::Map(record) = entry else {
        return FieldKind::Text.is_empty_leaf(entry);
    };
    record.iter().all(|(name, value)| match template.child(name) {
        Some(child) => child.kind.is_empty_leaf(value),
        None => FieldKind::Text.is_empty_leaf(value),
    })
}

fn reduce_nested(template: &Template, mut entry: Value) -> Value {
    let Some(record) = entry.as_map_mut() else {
        return entry;
    };
    for child in &template.children {
        let Some(nested) = child.kind.as_group() else {
            continue;
        };
        if let Some(value) = record.get_mut(&child.name) {
            let raw = RawInput::Provided(std::mem::replace(value, Value::Null));
            *value = reduce_submission(nested, normalize(nested, &raw)).into_value();
        }
    }
    entry
}
