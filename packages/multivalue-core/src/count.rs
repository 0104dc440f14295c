//! Delta count tracking: how many delta slots a control renders.
//!
//! The count is carried across round-trips by the caller (see the form
//! session state); this module only computes the next value. Limited
//! controls always render every slot; unlimited ones start with one empty
//! slot past the existing values and grow or shrink one slot per trigger.

use tracing::debug;

use crate::delta::DeltaList;
use crate::template::{Cardinality, Template};
use crate::types::Value;

/// User action that fired the current round-trip, as seen by one control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trigger {
    /// Plain rebuild, or the action targeted another control.
    #[default]
    None,
    /// "Add another item" was pressed.
    AddMore,
    /// The remove button of `delta` was pressed.
    Remove { delta: usize },
    /// Final submission (values get reordered and reduced).
    Submit,
}

/// Computes the number of delta slots to render.
///
/// Never returns less than 1 or less than the number of `values`, and never
/// more than a limited cardinality. Triggers that would cross a bound are
/// no-ops.
#[must_use]
pub fn resolve_count(
    template: &Template,
    values: &DeltaList,
    prior: Option<usize>,
    trigger: Trigger,
) -> usize {
    if let Cardinality::Limited(max) = template.cardinality {
        if matches!(trigger, Trigger::AddMore | Trigger::Remove { .. }) {
            debug!(control = %template.name, ?trigger, "trigger ignored for limited cardinality");
        }
        return max.get();
    }

    let base = match prior {
        // One empty slot is always offered after the existing values.
        None => values.len() + 1,
        Some(prior) => prior.max(values.len()).max(1),
    };

    match trigger {
        Trigger::AddMore => base.saturating_add(1),
        Trigger::Remove { .. } if base <= 1 => {
            debug!(control = %template.name, "remove ignored on the last delta");
            base
        }
        // Callers drop the removed value first, so this only hides a slot
        // that holds no value.
        Trigger::Remove { .. } => (base - 1).max(values.len()),
        Trigger::None | Trigger::Submit => base,
    }
}

/// Cuts `values` down to a limited cardinality. Unlimited templates keep
/// every value.
pub fn truncate_to_cardinality(template: &Template, values: &mut DeltaList) {
    if let Some(max) = template.cardinality.max() {
        if values.len() > max {
            debug!(
                control = %template.name,
                dropped = values.len() - max,
                "truncating values to cardinality"
            );
            values.truncate(max);
        }
    }
}

/// Builds exactly `count` deltas: the existing values first, then padding
/// records holding each child's own default value.
#[must_use]
pub fn materialize(template: &Template, values: &DeltaList, count: usize) -> Vec<Value> {
    (0..count)
        .map(|delta| {
            values
                .get(delta)
                .cloned()
                .unwrap_or_else(|| Value::Map(template.empty_record()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;

    use super::*;
    use crate::normalize::{normalize, RawInput};
    use crate::template::ChildField;

    fn unlimited() -> Template {
        Template::new("foo").with_child(ChildField::text("text"))
    }

    fn limited(n: usize) -> Template {
        Template::new("bar")
            .with_child(ChildField::number("number"))
            .with_cardinality(Cardinality::limited(n))
    }

    fn values(n: usize) -> DeltaList {
        (0..n).map(|i| Value::string(i.to_string())).collect()
    }

    #[test]
    fn unlimited_without_values_renders_one_slot() {
        assert_eq!(resolve_count(&unlimited(), &DeltaList::new(), None, Trigger::None), 1);
    }

    #[test]
    fn unlimited_offers_an_empty_slot_after_defaults() {
        assert_eq!(resolve_count(&unlimited(), &values(2), None, Trigger::None), 3);
    }

    #[test]
    fn add_more_increments_prior_count() {
        let count = resolve_count(&unlimited(), &DeltaList::new(), None, Trigger::None);
        let count = resolve_count(&unlimited(), &values(1), Some(count), Trigger::AddMore);
        assert_eq!(count, 2);
        let count = resolve_count(&unlimited(), &values(2), Some(count), Trigger::AddMore);
        assert_eq!(count, 3);
    }

    #[test]
    fn remove_never_goes_below_one() {
        let remove = Trigger::Remove { delta: 0 };
        assert_eq!(resolve_count(&unlimited(), &values(0), Some(3), remove), 2);
        assert_eq!(resolve_count(&unlimited(), &values(0), Some(1), remove), 1);
        assert_eq!(resolve_count(&unlimited(), &values(0), Some(0), remove), 1);
    }

    #[test]
    fn remove_keeps_slots_that_hold_values() {
        let remove = Trigger::Remove { delta: 1 };
        assert_eq!(resolve_count(&unlimited(), &values(3), Some(3), remove), 3);
        assert_eq!(resolve_count(&unlimited(), &values(2), Some(3), remove), 2);
    }

    #[test]
    fn add_more_saturates_at_the_largest_count() {
        let count = resolve_count(&unlimited(), &values(1), Some(usize::MAX), Trigger::AddMore);
        assert_eq!(count, usize::MAX);
    }

    #[test]
    fn prior_count_never_hides_values() {
        assert_eq!(resolve_count(&unlimited(), &values(4), Some(2), Trigger::None), 4);
    }

    #[test]
    fn limited_always_renders_every_slot() {
        let template = limited(3);
        assert_eq!(resolve_count(&template, &DeltaList::new(), None, Trigger::None), 3);
        assert_eq!(resolve_count(&template, &values(1), Some(3), Trigger::AddMore), 3);
        assert_eq!(
            resolve_count(&template, &values(1), Some(3), Trigger::Remove { delta: 0 }),
            3
        );
    }

    #[test]
    fn limited_truncates_extra_values() {
        let template = limited(3).with_default(Value::from(json!([1, 2, 3, 4])));
        let mut list = normalize(&template, &RawInput::Absent);
        truncate_to_cardinality(&template, &mut list);
        assert_eq!(
            list.into_value(),
            Value::from(json!([{"number": 1}, {"number": 2}, {"number": 3}]))
        );
    }

    #[test]
    fn materialize_pads_with_child_defaults() {
        let template = unlimited()
            .with_child(ChildField::checkboxes("boxes", &["a"]))
            .with_default(Value::from(json!([{"text": "a", "boxes": {"a": "a"}}])));
        let list = normalize(&template, &RawInput::Absent);
        let deltas = materialize(&template, &list, 2);
        assert_eq!(
            Value::Array(deltas),
            Value::from(json!([
                {"text": "a", "boxes": {"a": "a"}},
                {"text": "", "boxes": {"a": 0}}
            ]))
        );
    }

    proptest! {
        #[test]
        fn limited_never_exceeds_bound(max in 1usize..6, len in 0usize..12, prior in prop::option::of(0usize..12)) {
            let template = limited(max);
            let mut list = values(len);
            truncate_to_cardinality(&template, &mut list);
            prop_assert!(list.len() <= max);
            for trigger in [Trigger::None, Trigger::AddMore, Trigger::Remove { delta: 0 }, Trigger::Submit] {
                let count = resolve_count(&template, &list, prior, trigger);
                prop_assert_eq!(count, max);
                prop_assert_eq!(materialize(&template, &list, count).len(), max);
            }
        }

        #[test]
        fn unlimited_count_covers_values(len in 0usize..12, prior in prop::option::of(0usize..12)) {
            let list = values(len);
            for trigger in [Trigger::None, Trigger::AddMore, Trigger::Remove { delta: 0 }, Trigger::Submit] {
                let count = resolve_count(&unlimited(), &list, prior, trigger);
                prop_assert!(count >= 1);
                prop_assert!(count >= len);
            }
        }
    }
}
