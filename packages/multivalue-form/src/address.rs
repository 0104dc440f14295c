//! Structural addressing of controls, deltas and their elements.
//!
//! Every name and id the renderer needs is derived from the control's path
//! (enclosing container keys, then the control's own key) so that "add more"
//! buttons and partial updates target the right subtree, even for controls
//! nested inside other containers or inside a delta of another control.

use std::fmt;
use std::sync::LazyLock;

use multivalue_core::normalize::parse_delta_key;
use multivalue_core::Template;
use regex::Regex;
use serde::{Deserialize, Serialize};

static INVALID_ID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9\-_]").expect("valid id pattern"));

static HYPHEN_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("valid hyphen pattern"));

/// Path of a control inside the submitted data, outermost key first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ControlPath(Vec<String>);

impl ControlPath {
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Path of a top-level control: its parents followed by its name.
    #[must_use]
    pub fn for_template(template: &Template) -> Self {
        let mut segments = template.parents.clone();
        segments.push(template.name.clone());
        Self(segments)
    }

    /// Path of a nested group child inside delta `delta` of this control.
    #[must_use]
    pub fn nested(&self, delta: usize, child: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(delta.to_string());
        segments.push(child.to_string());
        Self(segments)
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Form element name of the control: `nested[inner][foo]`.
    #[must_use]
    pub fn key(&self) -> String {
        element_name(self.0.iter().map(String::as_str))
    }

    /// Element name of a child of one delta: `foo[0][text]`.
    #[must_use]
    pub fn field_name(&self, delta: usize, child: &str) -> String {
        let delta = delta.to_string();
        element_name(
            self.0
                .iter()
                .map(String::as_str)
                .chain([delta.as_str(), child]),
        )
    }

    /// Name of the "add more" button: `nested_inner_foo_add_more`.
    #[must_use]
    pub fn add_more_button(&self) -> String {
        format!("{}_add_more", self.0.join("_"))
    }

    /// Name of the remove button of one delta: `foo_1_remove`.
    #[must_use]
    pub fn remove_button(&self, delta: usize) -> String {
        format!("{}_{delta}_remove", self.0.join("_"))
    }

    /// Delta targeted by a remove button name of this control.
    #[must_use]
    pub fn parse_remove_button(&self, name: &str) -> Option<usize> {
        name.strip_prefix(self.0.join("_").as_str())
            .and_then(|rest| rest.strip_prefix('_'))
            .and_then(|rest| rest.strip_suffix("_remove"))
            .and_then(parse_delta_key)
    }

    /// Id of the element replaced on partial updates:
    /// `nested-inner-foo-add-more-wrapper`.
    #[must_use]
    pub fn wrapper_id(&self) -> String {
        clean_id(&format!("{}-add-more-wrapper", self.0.join("-")))
    }

    /// Id of the container of one delta: `edit-foo-0`.
    #[must_use]
    pub fn delta_id(&self, prefix: &str, delta: usize) -> String {
        clean_id(&format!("{prefix}-{}-{delta}", self.0.join("-")))
    }

    /// Id of a child element of one delta: `edit-foo-0-text`.
    #[must_use]
    pub fn field_id(&self, prefix: &str, delta: usize, child: &str) -> String {
        clean_id(&format!("{prefix}-{}-{delta}-{child}", self.0.join("-")))
    }
}

impl fmt::Display for ControlPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// Makes a string usable as an HTML id: lowercase, spaces, underscores and
/// `[` become hyphens, `]` and other invalid characters are dropped, and
/// hyphen runs collapse to one.
#[must_use]
pub fn clean_id(raw: &str) -> String {
    let replaced: String = raw
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            ' ' | '_' | '[' => Some('-'),
            ']' => None,
            other => Some(other),
        })
        .collect();
    let stripped = INVALID_ID_CHARS.replace_all(&replaced, "");
    HYPHEN_RUNS.replace_all(&stripped, "-").into_owned()
}

fn element_name<'a>(mut segments: impl Iterator<Item = &'a str>) -> String {
    let mut name = segments.next().unwrap_or_default().to_string();
    for segment in segments {
        name.push('[');
        name.push_str(segment);
        name.push(']');
    }
    name
}

#[cfg(test)]
mod tests {
    use multivalue_core::ChildField;

    use super::*;

    fn nested_foo() -> ControlPath {
        ControlPath::for_template(
            &Template::new("foo")
                .with_parents(["nested", "inner"])
                .with_child(ChildField::checkboxes("bar", &["a", "b"])),
        )
    }

    #[test]
    fn top_level_names() {
        let path = ControlPath::for_template(&Template::new("foo"));
        assert_eq!(path.key(), "foo");
        assert_eq!(path.field_name(0, "text"), "foo[0][text]");
        assert_eq!(path.field_name(1, "_weight"), "foo[1][_weight]");
        assert_eq!(path.add_more_button(), "foo_add_more");
        assert_eq!(path.remove_button(1), "foo_1_remove");
        assert_eq!(path.wrapper_id(), "foo-add-more-wrapper");
        assert_eq!(path.field_id("edit", 0, "text"), "edit-foo-0-text");
        assert_eq!(path.delta_id("edit", 2), "edit-foo-2");
    }

    #[test]
    fn remove_button_names_parse_back() {
        let path = nested_foo();
        assert_eq!(path.parse_remove_button(&path.remove_button(7)), Some(7));
        assert_eq!(path.parse_remove_button("nested_inner_foo_01_remove"), None);
        assert_eq!(path.parse_remove_button("nested_inner_foo_add_more"), None);
        assert_eq!(path.parse_remove_button("foo_0_remove"), None);
        assert_eq!(path.parse_remove_button("nested_inner_foox_0_remove"), None);
    }

    #[test]
    fn nested_names_follow_structure() {
        let path = nested_foo();
        assert_eq!(path.key(), "nested[inner][foo]");
        assert_eq!(path.field_name(1, "bar"), "nested[inner][foo][1][bar]");
        assert_eq!(path.add_more_button(), "nested_inner_foo_add_more");
        assert_eq!(path.wrapper_id(), "nested-inner-foo-add-more-wrapper");
        assert_eq!(path.to_string(), "nested[inner][foo]");
    }

    #[test]
    fn group_inside_delta() {
        let inner = ControlPath::for_template(&Template::new("outer")).nested(2, "items");
        assert_eq!(inner.key(), "outer[2][items]");
        assert_eq!(inner.field_name(0, "text"), "outer[2][items][0][text]");
        assert_eq!(inner.add_more_button(), "outer_2_items_add_more");
        assert_eq!(inner.wrapper_id(), "outer-2-items-add-more-wrapper");
    }

    #[test]
    fn ids_are_cleaned() {
        assert_eq!(clean_id("Partial_Required"), "partial-required");
        assert_eq!(clean_id("a[b][c]"), "a-b-c");
        assert_eq!(clean_id("a  b__c"), "a-b-c");
        assert_eq!(clean_id("é!x"), "x");
        assert_eq!(
            clean_id("edit-partial_required-0-baz"),
            "edit-partial-required-0-baz"
        );
    }
}
