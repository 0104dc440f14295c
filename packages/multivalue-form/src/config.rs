//! Configuration for multi-value controls.

use serde::{Deserialize, Serialize};

/// Form-level configuration shared by every control of a form.
///
/// Deserializes from a partial JSON document: missing keys keep their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Key of the per-delta weight element. Stripped from submitted values.
    pub weight_field: String,
    /// Label of the "add more" button when the template sets none.
    pub add_more_label: String,
    /// Label of the per-delta remove button.
    pub remove_label: String,
    /// Prefix of generated element ids (`edit-foo-0-text`).
    pub id_prefix: String,
    /// Triggering element names that submit the form.
    pub submit_buttons: Vec<String>,
    /// Most deltas an unlimited control renders beyond the values it holds.
    /// Counts carried in state tokens are capped by it.
    pub max_blank_deltas: usize,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            weight_field: "_weight".to_string(),
            add_more_label: "Add another item".to_string(),
            remove_label: "Remove".to_string(),
            id_prefix: "edit".to_string(),
            submit_buttons: vec!["op".to_string(), "submit".to_string()],
            max_blank_deltas: 100,
        }
    }
}

impl FormConfig {
    /// Upper bound on the count of a control holding `values` deltas.
    #[must_use]
    pub fn count_cap(&self, values: usize) -> usize {
        values.saturating_add(self.max_blank_deltas).max(1)
    }

    /// Whether `name` is one of the configured submit buttons.
    #[must_use]
    pub fn is_submit_button(&self, name: &str) -> bool {
        self.submit_buttons.iter().any(|button| button == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_config_defaults() {
        let config = FormConfig::default();
        assert_eq!(config.weight_field, "_weight");
        assert_eq!(config.add_more_label, "Add another item");
        assert_eq!(config.remove_label, "Remove");
        assert_eq!(config.id_prefix, "edit");
        assert!(config.is_submit_button("op"));
        assert!(config.is_submit_button("submit"));
        assert!(!config.is_submit_button("foo_add_more"));
        assert_eq!(config.max_blank_deltas, 100);
    }

    #[test]
    fn count_cap_leaves_room_for_one_delta() {
        let config = FormConfig {
            max_blank_deltas: 0,
            ..FormConfig::default()
        };
        assert_eq!(config.count_cap(0), 1);
        assert_eq!(config.count_cap(3), 3);
        assert_eq!(FormConfig::default().count_cap(usize::MAX), usize::MAX);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: FormConfig =
            serde_json::from_str(r#"{"add_more_label": "Add more complexity"}"#).unwrap();
        assert_eq!(config.add_more_label, "Add more complexity");
        assert_eq!(config.weight_field, "_weight");
        assert_eq!(config.submit_buttons, vec!["op", "submit"]);
    }
}
