//! The multi-value control: ties the value engine, the session state and the
//! addressing together for one control instance.

use std::borrow::Cow;

use multivalue_core::{
    default_weight, is_child_required, materialize, normalize, reduce_submission, reorder,
    reorder_indexed, resolve_count, truncate_to_cardinality, weight_range, ChildField, DeltaList,
    RawInput, Template, Trigger, Value,
};
use tracing::debug;

use crate::address::ControlPath;
use crate::config::FormConfig;
use crate::render::{RenderedButton, RenderedChild, RenderedControl, RenderedDelta, RenderedWeight};
use crate::state::FormState;
use crate::trigger::FormTrigger;

/// One multi-value control instance at a fixed path of a form.
#[derive(Debug, Clone)]
pub struct MultiValueControl<'a> {
    template: Cow<'a, Template>,
    path: ControlPath,
    /// Path the previous response rendered this control at. Differs from
    /// `path` once an enclosing delta moved, and is `None` for a group that
    /// did not exist in the previous response.
    origin: Option<ControlPath>,
    config: &'a FormConfig,
}

impl<'a> MultiValueControl<'a> {
    #[must_use]
    pub fn new(template: &'a Template, path: ControlPath, config: &'a FormConfig) -> Self {
        Self {
            template: Cow::Borrowed(template),
            origin: Some(path.clone()),
            path,
            config,
        }
    }

    /// A top-level control, addressed by the template's parents and name.
    #[must_use]
    pub fn for_template(template: &'a Template, config: &'a FormConfig) -> Self {
        Self::new(template, ControlPath::for_template(template), config)
    }

    /// Overrides the template's required flag (required propagated into a
    /// nested group).
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        if self.template.required != required {
            self.template.to_mut().required = required;
        }
        self
    }

    #[must_use]
    fn with_origin(mut self, origin: Option<ControlPath>) -> Self {
        self.origin = origin;
        self
    }

    #[must_use]
    pub fn path(&self) -> &ControlPath {
        &self.path
    }

    #[must_use]
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Builds the render plan for this control and records the rendered
    /// count (and those of nested groups) in `next`.
    ///
    /// `prior` is the state of the previous round-trip. Posted input is put
    /// back into the order the client's weights describe. Remove buttons,
    /// nested triggers and nested prior counts still name deltas as the
    /// previous response numbered them, so they are resolved against the
    /// posted position of each delta.
    pub fn render(
        &self,
        prior: &FormState,
        next: &mut FormState,
        raw: &RawInput,
        trigger: &FormTrigger,
    ) -> RenderedControl {
        let template = self.template.as_ref();
        let own_trigger = self
            .origin
            .as_ref()
            .map_or(Trigger::None, |origin| trigger.for_control(origin));
        let prior_count = self.origin.as_ref().and_then(|origin| prior.count(origin));

        let normalized = normalize(template, raw);
        let removable = template.cardinality.is_unlimited()
            && resolve_count(template, &normalized, prior_count, Trigger::None) > 1;
        let mut entries = if matches!(raw, RawInput::Provided(_)) && template.is_orderable() {
            reorder_indexed(normalized.into_vec(), &self.config.weight_field)
        } else {
            normalized.into_iter().enumerate().collect()
        };
        if let Trigger::Remove { delta } = own_trigger {
            let position = entries.iter().position(|(origin, _)| *origin == delta);
            if let Some(position) = position.filter(|_| removable) {
                entries.remove(position);
                debug!(control = %self.path, delta, "removed delta");
            }
        }
        let (origins, values): (Vec<usize>, Vec<Value>) = entries.into_iter().unzip();
        let mut values = DeltaList::from(values);
        truncate_to_cardinality(template, &mut values);

        let mut count = resolve_count(template, &values, prior_count, own_trigger);
        if template.cardinality.is_unlimited() {
            let cap = self.config.count_cap(values.len());
            if count > cap {
                debug!(control = %self.path, count, cap, "capping delta count");
                count = cap;
            }
        }
        next.set_count(&self.path, count);
        debug!(control = %self.path, count, values = values.len(), "rendering control");

        let deltas = materialize(template, &values, count)
            .iter()
            .enumerate()
            .map(|(delta, entry)| {
                let context = DeltaContext {
                    delta,
                    count,
                    entry,
                    origin: if delta < values.len() {
                        origins.get(delta).copied()
                    } else {
                        None
                    },
                };
                self.render_delta(&context, prior, next, trigger)
            })
            .collect();

        let add_more = template
            .cardinality
            .is_unlimited()
            .then(|| RenderedButton {
                name: self.path.add_more_button(),
                label: template
                    .add_more_label
                    .clone()
                    .unwrap_or_else(|| self.config.add_more_label.clone()),
                wrapper_id: self.path.wrapper_id(),
            });

        RenderedControl {
            key: self.path.key(),
            title: template.title.clone(),
            wrapper_id: self.path.wrapper_id(),
            cardinality: template.cardinality.into(),
            count,
            required: template.required,
            deltas,
            add_more,
        }
    }

    /// Turns the final submitted input into the stored value: normalized,
    /// ordered by weight (nested groups too), bounded by cardinality and
    /// without blank deltas.
    #[must_use]
    pub fn submit(&self, raw: &RawInput) -> DeltaList {
        let values = prepare_submission(&self.template, raw, &self.config.weight_field);
        let submitted = reduce_submission(&self.template, values);
        debug!(control = %self.path, deltas = submitted.len(), "submitted control");
        submitted
    }

    fn render_delta(
        &self,
        context: &DeltaContext<'_>,
        prior: &FormState,
        next: &mut FormState,
        trigger: &FormTrigger,
    ) -> RenderedDelta {
        let template = self.template.as_ref();
        let delta = context.delta;

        let weight = template.is_orderable().then(|| RenderedWeight {
            name: self.path.field_name(delta, &self.config.weight_field),
            value: default_weight(delta, context.count),
            options: weight_range(context.count).collect(),
        });

        let children = template
            .children
            .iter()
            .map(|child| self.render_child(child, context, prior, next, trigger))
            .collect();

        let remove = template.cardinality.is_unlimited().then(|| RenderedButton {
            name: self.path.remove_button(delta),
            label: self.config.remove_label.clone(),
            wrapper_id: self.path.wrapper_id(),
        });

        RenderedDelta {
            delta,
            id: self.path.delta_id(&self.config.id_prefix, delta),
            weight,
            children,
            remove,
        }
    }

    fn render_child(
        &self,
        child: &ChildField,
        context: &DeltaContext<'_>,
        prior: &FormState,
        next: &mut FormState,
        trigger: &FormTrigger,
    ) -> RenderedChild {
        let delta = context.delta;
        let required = is_child_required(&self.template, &child.name, delta);
        let current = context.entry.get(&child.name);

        let group = child.kind.as_group().map(|nested| {
            // Padding deltas start the nested group from its own defaults.
            let raw = if context.origin.is_some() {
                RawInput::from(current.cloned())
            } else {
                RawInput::Absent
            };
            let origin = self
                .origin
                .as_ref()
                .zip(context.origin)
                .map(|(path, posted)| path.nested(posted, &child.name));
            let control =
                MultiValueControl::new(nested, self.path.nested(delta, &child.name), self.config)
                    .with_origin(origin)
                    .with_required(nested.required || required);
            Box::new(control.render(prior, next, &raw, trigger))
        });

        RenderedChild {
            field: child.name.clone(),
            name: self.path.field_name(delta, &child.name),
            id: self
                .path
                .field_id(&self.config.id_prefix, delta, &child.name),
            title: child.title.clone(),
            html_type: child.kind.html_type(),
            required,
            value: current.cloned().unwrap_or_else(|| child.default_value()),
            group,
        }
    }
}

struct DeltaContext<'e> {
    delta: usize,
    count: usize,
    entry: &'e Value,
    /// Position of the delta in the posted input; `None` for padding.
    origin: Option<usize>,
}

fn prepare_submission(template: &Template, raw: &RawInput, weight_field: &str) -> DeltaList {
    let mut values = normalize(template, raw);
    if template.is_orderable() {
        values = reorder(values.into_vec(), weight_field);
    }
    truncate_to_cardinality(template, &mut values);

    values
        .into_iter()
        .map(|mut entry| {
            if let Some(record) = entry.as_map_mut() {
                for child in &template.children {
                    let Some(nested) = child.kind.as_group() else {
                        continue;
                    };
                    if let Some(value) = record.get_mut(&child.name) {
                        let raw = RawInput::Provided(std::mem::replace(value, Value::Null));
                        *value = prepare_submission(nested, &raw, weight_field).into_value();
                    }
                }
            }
            entry
        })
        .collect()
}
