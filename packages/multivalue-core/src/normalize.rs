//! Value normalization: raw defaults or submitted input -> [`DeltaList`].
//!
//! Incoming values can be lists of scalars, sparse or associative maps,
//! partial records, or anything else a form author or a client sends. The
//! normalizer never rejects input: unusable keys and shapes are dropped, and
//! the survivors are reindexed into a dense list ordered by their original
//! numeric key.
//!
//! # Single-child shorthand
//!
//! When a template has exactly one child, a scalar entry stands for a record
//! holding only that child: `["a", "b"]` is read as
//! `[{"text": "a"}, {"text": "b"}]`. Records pass through untouched. A list
//! entry (`[["a"]]`) is ambiguous and also passes through untouched, so the
//! delta keeps the list instead of a record. Templates with more than one
//! child never get the shorthand.

use tracing::debug;

use crate::delta::DeltaList;
use crate::template::Template;
use crate::types::{Record, Value};

/// Raw value handed to the normalizer.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    /// No input was supplied: use the template's default value.
    Absent,
    /// Input supplied by the client. Used verbatim, never merged with defaults.
    Provided(Value),
}

impl From<Option<Value>> for RawInput {
    fn from(value: Option<Value>) -> Self {
        value.map_or(RawInput::Absent, RawInput::Provided)
    }
}

/// Converts a raw default or input into the canonical delta list.
///
/// The result has contiguous indices from 0 and is not bounded by the
/// template's cardinality.
#[must_use]
pub fn normalize(template: &Template, raw: &RawInput) -> DeltaList {
    let source = match raw {
        RawInput::Absent => template.default_value.as_ref(),
        RawInput::Provided(value) => Some(value),
    };
    let Some(source) = source else {
        return DeltaList::new();
    };

    let mut entries = indexed_entries(template, source);
    entries.sort_by_key(|(index, _)| *index);

    let shorthand = template.single_child().map(|child| child.name.as_str());
    entries
        .into_iter()
        .map(|(_, entry)| match shorthand {
            Some(child) if entry.is_scalar() => {
                let mut record = Record::new();
                record.insert(child.to_string(), entry.clone());
                Value::Map(record)
            }
            _ => entry.clone(),
        })
        .collect()
}

/// Parses a delta key. Only canonical non-negative integers are accepted:
/// `"0"` and `"12"`, but not `"01"`, `"+1"`, `"-1"` or `"1.0"`.
#[must_use]
pub fn parse_delta_key(key: &str) -> Option<usize> {
    let canonical = key == "0" || (!key.starts_with('0') && !key.is_empty());
    if !canonical || !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

fn indexed_entries<'a>(template: &Template, source: &'a Value) -> Vec<(usize, &'a Value)> {
    match source {
        Value::Array(items) => items.iter().enumerate().collect(),
        Value::Map(map) => map
            .iter()
            .filter_map(|(key, entry)| match parse_delta_key(key) {
                Some(index) => Some((index, entry)),
                None => {
                    debug!(control = %template.name, key = %key, "discarding non-delta key");
                    None
                }
            })
            .collect(),
        Value::Null => Vec::new(),
        other => {
            debug!(control = %template.name, value = ?other, "discarding non-container value");
            Vec::new()
        }
    }
}
