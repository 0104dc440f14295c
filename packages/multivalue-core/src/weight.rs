//! Delta ordering by user-assigned weight.
//!
//! While a control is being edited every delta carries a weight the client
//! can change (drag handle or numeric select). Weights for `n` rendered
//! deltas span the centered range `[-floor(n/2), n - 1 - floor(n/2)]`, and
//! delta `i` starts at `i - floor(n/2)` so the initial order is ascending.

use std::ops::RangeInclusive;

use crate::delta::DeltaList;
use crate::types::Value;

/// Permitted weights for `count` rendered deltas.
///
/// ```
/// use multivalue_core::weight::weight_range;
///
/// assert_eq!(weight_range(3), -1..=1);
/// assert_eq!(weight_range(5), -2..=2);
/// ```
#[must_use]
pub fn weight_range(count: usize) -> RangeInclusive<i64> {
    let count = i64::try_from(count.max(1)).unwrap_or(i64::MAX);
    let low = -(count / 2);
    low..=low + count - 1
}

/// Weight delta `delta` starts with when `count` deltas are rendered.
#[must_use]
pub fn default_weight(delta: usize, count: usize) -> i64 {
    let delta = i64::try_from(delta).unwrap_or(i64::MAX);
    weight_range(count).start().saturating_add(delta)
}

/// Sorts deltas ascending by weight and strips the weight from each record.
///
/// The sort is stable: equal weights keep their delta order. A delta with a
/// missing or unreadable weight sorts as if it still had its default weight.
/// Entries that are not records are positioned by their default weight and
/// returned unchanged.
#[must_use]
pub fn reorder(deltas: Vec<Value>, weight_field: &str) -> DeltaList {
    reorder_indexed(deltas, weight_field)
        .into_iter()
        .map(|(_, entry)| entry)
        .collect()
}

/// Like [`reorder`], but pairs every entry with the delta it held before
/// sorting. Buttons and nested state from the previous round-trip are keyed
/// by that delta.
#[must_use]
pub fn reorder_indexed(deltas: Vec<Value>, weight_field: &str) -> Vec<(usize, Value)> {
    let count = deltas.len();
    let mut weighted: Vec<(f64, usize, Value)> = deltas
        .into_iter()
        .enumerate()
        .map(|(delta, mut entry)| {
            let weight = entry
                .as_map_mut()
                .and_then(|record| record.remove(weight_field))
                .and_then(|weight| weight.as_weight());
            #[allow(clippy::cast_precision_loss)]
            let fallback = default_weight(delta, count) as f64;
            (weight.unwrap_or(fallback), delta, entry)
        })
        .collect();

    weighted.sort_by(|(a, _, _), (b, _, _)| a.total_cmp(b));
    weighted
        .into_iter()
        .map(|(_, delta, entry)| (delta, entry))
        .collect()
}
