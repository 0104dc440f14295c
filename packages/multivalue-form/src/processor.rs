//! Request-level processing of a form made of multi-value controls.
//!
//! One call handles one round-trip: an initial render, a rebuild after an
//! "add more" or remove button, or the final submission. The delta counts
//! travel in the opaque state token of [`FormResponse::Rendered`].

use std::sync::Arc;

use multivalue_core::normalize::parse_delta_key;
use multivalue_core::{RawInput, Record, Template, Value};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::address::ControlPath;
use crate::config::FormConfig;
use crate::control::MultiValueControl;
use crate::error::FormError;
use crate::render::RenderedControl;
use crate::state::FormState;
use crate::trigger::{classify, FormTrigger};

/// A form: an id and its top-level multi-value controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub id: String,
    pub controls: Vec<Template>,
}

/// One incoming round-trip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormRequest {
    /// Posted key/value data. `None` on the first render.
    pub posted: Option<Value>,
    /// Name of the button that fired the request.
    pub triggering_element: Option<String>,
    /// Token returned by the previous response.
    pub state_token: Option<String>,
}

/// Result of one round-trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FormResponse {
    /// The form must be shown again.
    Rendered {
        controls: Vec<RenderedControl>,
        state_token: String,
    },
    /// Final cleaned values, nested like the posted data.
    Submitted { values: Value },
}

/// Processes requests against form definitions.
#[derive(Debug, Clone, Default)]
pub struct FormProcessor {
    config: Arc<FormConfig>,
}

impl FormProcessor {
    #[must_use]
    pub fn new(config: Arc<FormConfig>) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Handles one round-trip of `form`.
    ///
    /// # Errors
    ///
    /// Returns a `FormError` when the state token is malformed or belongs to
    /// another form, or when the triggering element names no known button.
    pub fn process(
        &self,
        form: &FormDefinition,
        request: &FormRequest,
    ) -> Result<FormResponse, FormError> {
        let span = info_span!(
            "form",
            form_id = %form.id,
            posted = request.posted.is_some(),
            trigger = request.triggering_element.as_deref().unwrap_or(""),
        );
        let _guard = span.enter();

        let Some(posted) = &request.posted else {
            info!("initial render");
            let fresh = FormState::new(form.id.clone());
            return self.rebuild(form, &fresh, None, &FormTrigger::None);
        };

        let prior = match &request.state_token {
            Some(token) => FormState::decode(token, &form.id)?,
            None => FormState::new(form.id.clone()),
        };

        let known = known_controls(form, &prior);
        let trigger = classify(
            &self.config,
            known.iter().map(|(path, count)| (path, *count)),
            request.triggering_element.as_deref(),
        )?;
        debug!(?trigger, "classified trigger");

        match trigger {
            FormTrigger::Submit => Ok(self.submit(form, posted)),
            trigger => self.rebuild(form, &prior, Some(posted), &trigger),
        }
    }

    fn rebuild(
        &self,
        form: &FormDefinition,
        prior: &FormState,
        posted: Option<&Value>,
        trigger: &FormTrigger,
    ) -> Result<FormResponse, FormError> {
        let mut next = FormState::new(form.id.clone());
        let controls: Vec<RenderedControl> = form
            .controls
            .iter()
            .map(|template| {
                let control = MultiValueControl::for_template(template, &self.config);
                let raw = control_input(posted, control.path());
                control.render(prior, &mut next, &raw, trigger)
            })
            .collect();

        info!(controls = controls.len(), "form rendered");
        Ok(FormResponse::Rendered {
            controls,
            state_token: next.encode()?,
        })
    }

    fn submit(&self, form: &FormDefinition, posted: &Value) -> FormResponse {
        let mut values = Record::new();
        for template in &form.controls {
            let control = MultiValueControl::for_template(template, &self.config);
            let raw = control_input(Some(posted), control.path());
            let submitted = control.submit(&raw);
            insert_at(&mut values, control.path().segments(), submitted.into_value());
        }

        info!(controls = form.controls.len(), "form submitted");
        FormResponse::Submitted {
            values: Value::Map(values),
        }
    }
}

/// Controls whose buttons may have fired: everything the prior response
/// rendered, plus the form's top-level controls.
fn known_controls(form: &FormDefinition, prior: &FormState) -> Vec<(ControlPath, usize)> {
    let mut known: Vec<(ControlPath, usize)> = prior
        .controls()
        .map(|control| (control.path.clone(), control.count))
        .collect();
    for template in &form.controls {
        let path = ControlPath::for_template(template);
        if prior.count(&path).is_none() {
            known.push((path, 0));
        }
    }
    known
}

/// Raw input of the control at `path`. A control missing from posted data
/// was posted empty.
fn control_input(posted: Option<&Value>, path: &ControlPath) -> RawInput {
    match posted {
        None => RawInput::Absent,
        Some(posted) => {
            let input = lookup(posted, path.segments()).cloned();
            RawInput::Provided(input.unwrap_or(Value::Null))
        }
    }
}

fn lookup<'v>(value: &'v Value, segments: &[String]) -> Option<&'v Value> {
    segments.iter().try_fold(value, |current, segment| match current {
        Value::Map(map) => map.get(segment),
        Value::Array(items) => parse_delta_key(segment).and_then(|index| items.get(index)),
        _ => None,
    })
}

fn insert_at(record: &mut Record, segments: &[String], value: Value) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };
    let mut current = record;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Map(Record::new()));
        if entry.as_map().is_none() {
            *entry = Value::Map(Record::new());
        }
        let Some(map) = entry.as_map_mut() else {
            return;
        };
        current = map;
    }
    current.insert(last.clone(), value);
}

#[cfg(test)]
mod tests {
    use multivalue_core::{Cardinality, ChildField};
    use serde_json::json;

    use super::*;

    fn form() -> FormDefinition {
        FormDefinition {
            id: "element_test_form".to_string(),
            controls: vec![
                Template::new("foo").with_child(ChildField::text("text")),
                Template::new("bar")
                    .with_child(ChildField::number("number"))
                    .with_cardinality(Cardinality::limited(3)),
                Template::new("foo")
                    .with_parents(["nested", "inner"])
                    .with_child(ChildField::checkboxes("bar", &["a", "b"])),
            ],
        }
    }

    fn processor() -> FormProcessor {
        FormProcessor::new(Arc::new(FormConfig::default()))
    }

    fn rendered(response: FormResponse) -> (Vec<RenderedControl>, String) {
        match response {
            FormResponse::Rendered {
                controls,
                state_token,
            } => (controls, state_token),
            FormResponse::Submitted { values } => panic!("expected a render, got {values:?}"),
        }
    }

    fn posted(json: serde_json::Value) -> Option<Value> {
        Some(Value::from(json))
    }

    #[test]
    fn initial_render_uses_defaults_and_issues_token() {
        let form = form();
        let response = processor().process(&form, &FormRequest::default()).unwrap();
        let (controls, token) = rendered(response);
        let counts: Vec<usize> = controls.iter().map(|control| control.count).collect();
        assert_eq!(counts, vec![1, 3, 1]);

        let state = FormState::decode(&token, "element_test_form").unwrap();
        assert_eq!(state.controls().count(), 3);
    }

    #[test]
    fn add_more_targets_one_control() {
        let form = form();
        let processor = processor();
        let (_, token) = rendered(processor.process(&form, &FormRequest::default()).unwrap());

        let request = FormRequest {
            posted: posted(json!({
                "foo": {"0": {"text": "", "_weight": "0"}},
                "nested": {"inner": {"foo": {"0": {"bar": {"a": "a", "b": 0}, "_weight": "0"}}}}
            })),
            triggering_element: Some("nested_inner_foo_add_more".to_string()),
            state_token: Some(token),
        };
        let (controls, token) = rendered(processor.process(&form, &request).unwrap());
        assert_eq!(controls[0].count, 1);
        assert_eq!(controls[1].count, 3);
        assert_eq!(controls[2].count, 2);
        assert_eq!(
            controls[2].find_field("nested[inner][foo][0][bar]").unwrap().value,
            Value::from(json!({"a": "a", "b": 0}))
        );

        // The next round-trip remembers the grown control.
        let request = FormRequest {
            posted: posted(json!({})),
            triggering_element: Some("foo_add_more".to_string()),
            state_token: Some(token),
        };
        let (controls, _) = rendered(processor.process(&form, &request).unwrap());
        assert_eq!(controls[0].count, 2);
        assert_eq!(controls[2].count, 2);
    }

    #[test]
    fn remove_button_of_rendered_delta() {
        let form = form();
        let processor = processor();
        let mut state = FormState::new("element_test_form");
        state.set_count(&ControlPath::new(vec!["foo".to_string()]), 3);

        let request = FormRequest {
            posted: posted(json!({"foo": [{"text": "a"}, {"text": "b"}, {"text": "c"}]})),
            triggering_element: Some("foo_0_remove".to_string()),
            state_token: Some(state.encode().unwrap()),
        };
        let (controls, _) = rendered(processor.process(&form, &request).unwrap());
        assert_eq!(controls[0].count, 2);
        assert_eq!(
            controls[0].find_field("foo[0][text]").unwrap().value,
            Value::from("b")
        );
    }

    #[test]
    fn submit_nests_values_under_parents() {
        let form = form();
        let request = FormRequest {
            posted: posted(json!({
                "foo": {"0": {"text": "a", "_weight": "0"}, "1": {"text": "", "_weight": "1"}},
                "bar": [
                    {"number": "1", "_weight": "0"},
                    {"number": "2", "_weight": "-1"},
                    {"number": "", "_weight": "1"}
                ],
                "nested": {"inner": {"foo": {"0": {"bar": {"a": 0, "b": 0}}}}}
            })),
            triggering_element: Some("op".to_string()),
            state_token: None,
        };
        let response = processor().process(&form, &request).unwrap();
        assert_eq!(
            response,
            FormResponse::Submitted {
                values: Value::from(json!({
                    "foo": [{"text": "a"}],
                    "bar": [{"number": "2"}, {"number": "1"}],
                    "nested": {"inner": {"foo": []}}
                }))
            }
        );
    }

    #[test]
    fn missing_trigger_submits_and_missing_controls_are_empty() {
        let form = form();
        let request = FormRequest {
            posted: posted(json!({})),
            ..FormRequest::default()
        };
        let FormResponse::Submitted { values } = processor().process(&form, &request).unwrap() else {
            panic!("expected a submission");
        };
        assert_eq!(
            values,
            Value::from(json!({"foo": [], "bar": [], "nested": {"inner": {"foo": []}}}))
        );
    }

    #[test]
    fn forged_token_count_is_capped() {
        let form = form();
        let mut state = FormState::new("element_test_form");
        state.set_count(&ControlPath::new(vec!["foo".to_string()]), usize::MAX);
        let request = FormRequest {
            posted: posted(json!({})),
            triggering_element: Some("foo_add_more".to_string()),
            state_token: Some(state.encode().unwrap()),
        };
        let (controls, token) = rendered(processor().process(&form, &request).unwrap());
        let cap = FormConfig::default().count_cap(0);
        assert_eq!(controls[0].count, cap);
        assert_eq!(controls[0].deltas.len(), cap);
        let next = FormState::decode(&token, "element_test_form").unwrap();
        assert_eq!(next.count(&ControlPath::new(vec!["foo".to_string()])), Some(cap));
    }

    #[test]
    fn token_of_another_form_is_rejected() {
        let token = FormState::new("other_form").encode().unwrap();
        let request = FormRequest {
            posted: posted(json!({})),
            triggering_element: Some("foo_add_more".to_string()),
            state_token: Some(token),
        };
        let err = processor().process(&form(), &request).unwrap_err();
        assert!(matches!(err, FormError::FormMismatch { .. }));
    }

    #[test]
    fn unknown_trigger_is_rejected() {
        let request = FormRequest {
            posted: posted(json!({})),
            triggering_element: Some("baz_add_more".to_string()),
            state_token: None,
        };
        let err = processor().process(&form(), &request).unwrap_err();
        assert!(matches!(err, FormError::Classify(_)));
        assert_eq!(err.to_string(), "unknown triggering element: baz_add_more");
    }

    #[test]
    fn definitions_and_requests_deserialize() {
        let form: FormDefinition = serde_json::from_value(json!({
            "id": "f",
            "controls": [{
                "name": "foo",
                "cardinality": 2,
                "children": [{"name": "text", "type": "text"}]
            }]
        }))
        .unwrap();
        assert_eq!(form.controls[0].cardinality, Cardinality::limited(2));

        let request: FormRequest =
            serde_json::from_value(json!({"triggering_element": "foo_add_more"})).unwrap();
        assert!(request.posted.is_none());
        assert_eq!(request.triggering_element.as_deref(), Some("foo_add_more"));
    }

    #[test]
    fn lookup_walks_maps_and_lists() {
        let value = Value::from(json!({"a": [{"b": 1}]}));
        let segments = ["a".to_string(), "0".to_string(), "b".to_string()];
        assert_eq!(lookup(&value, &segments), Some(&Value::Int(1)));
        assert_eq!(lookup(&value, &segments[..1]).map(Value::is_scalar), Some(false));
        assert_eq!(lookup(&value, &["x".to_string()]), None);
    }
}
