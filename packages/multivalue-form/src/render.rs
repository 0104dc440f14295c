//! Render plan handed to the external renderer.
//!
//! A plan describes every element of a control (names, ids, values, flags)
//! without producing markup. Nested groups appear as nested controls.

use multivalue_core::Value;
use serde::Serialize;

/// Fully described multi-value control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedControl {
    /// Element name of the control: `nested[inner][foo]`.
    pub key: String,
    pub title: String,
    /// Id of the element replaced on partial updates.
    pub wrapper_id: String,
    /// `-1` for unlimited.
    pub cardinality: i64,
    /// Number of deltas rendered, as saved in the session state.
    pub count: usize,
    pub required: bool,
    pub deltas: Vec<RenderedDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_more: Option<RenderedButton>,
}

impl RenderedControl {
    /// Finds a child element by its full element name, searching nested
    /// groups too.
    #[must_use]
    pub fn find_field(&self, name: &str) -> Option<&RenderedChild> {
        self.deltas
            .iter()
            .flat_map(|delta| delta.children.iter())
            .find_map(|child| {
                if child.name == name {
                    return Some(child);
                }
                child.group.as_deref().and_then(|group| group.find_field(name))
            })
    }

    /// Element names of every weight element, in delta order.
    #[must_use]
    pub fn weight_names(&self) -> Vec<&str> {
        self.deltas
            .iter()
            .filter_map(|delta| delta.weight.as_ref())
            .map(|weight| weight.name.as_str())
            .collect()
    }
}

/// One delta of a control.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDelta {
    pub delta: usize,
    pub id: String,
    /// Present when the control is orderable.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<RenderedWeight>,
    pub children: Vec<RenderedChild>,
    /// Present for unlimited controls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove: Option<RenderedButton>,
}

impl RenderedDelta {
    /// The child with the given field key (`text`, not `foo[0][text]`).
    #[must_use]
    pub fn child(&self, field: &str) -> Option<&RenderedChild> {
        self.children.iter().find(|child| child.field == field)
    }
}

/// Weight element of one delta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedWeight {
    pub name: String,
    pub value: i64,
    pub options: Vec<i64>,
}

/// One child element of one delta.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedChild {
    /// Field key inside the delta record.
    pub field: String,
    /// Full element name: `foo[0][text]`.
    pub name: String,
    pub id: String,
    pub title: String,
    pub html_type: &'static str,
    pub required: bool,
    pub value: Value,
    /// The nested control when the child is a repeatable group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<Box<RenderedControl>>,
}

/// A button that triggers a partial update of `wrapper_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedButton {
    pub name: String,
    pub label: String,
    pub wrapper_id: String,
}
