//! Declarative description of a multi-value control.
//!
//! A [`Template`] lists the child fields repeated in every delta, the
//! cardinality bound, an optional default value and the required flag. It is
//! immutable for the duration of one render or submission cycle.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::types::{Record, Value};

/// Wire value of [`Cardinality::Unlimited`].
pub const CARDINALITY_UNLIMITED: i64 = -1;

/// Maximum number of deltas a control accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum Cardinality {
    /// Any number of deltas; the user adds rows one at a time.
    #[default]
    Unlimited,
    /// Exactly this many deltas are rendered, extra values are dropped.
    Limited(NonZeroUsize),
}

impl Cardinality {
    /// Builds a limited cardinality; `0` is treated as unlimited.
    #[must_use]
    pub fn limited(n: usize) -> Self {
        NonZeroUsize::new(n).map_or(Cardinality::Unlimited, Cardinality::Limited)
    }

    /// The upper bound, or `None` when unlimited.
    #[must_use]
    pub fn max(self) -> Option<usize> {
        match self {
            Cardinality::Unlimited => None,
            Cardinality::Limited(n) => Some(n.get()),
        }
    }

    #[must_use]
    pub fn is_unlimited(self) -> bool {
        matches!(self, Cardinality::Unlimited)
    }
}

/// Rejected cardinality wire value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid cardinality {0}: expected a positive integer or -1")]
pub struct InvalidCardinality(pub i64);

impl TryFrom<i64> for Cardinality {
    type Error = InvalidCardinality;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        if raw == CARDINALITY_UNLIMITED {
            return Ok(Cardinality::Unlimited);
        }
        usize::try_from(raw)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Cardinality::Limited)
            .ok_or(InvalidCardinality(raw))
    }
}

impl From<Cardinality> for i64 {
    fn from(cardinality: Cardinality) -> Self {
        match cardinality {
            Cardinality::Unlimited => CARDINALITY_UNLIMITED,
            Cardinality::Limited(n) => i64::try_from(n.get()).unwrap_or(i64::MAX),
        }
    }
}

/// Kind of a child field, carrying the per-kind value capabilities.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    /// Single-line text input.
    #[default]
    Text,
    /// Numeric input. Values stay as submitted (text), no coercion.
    Number,
    /// Single choice among `options`.
    Select { options: Vec<String> },
    /// Single on/off checkbox. Unchecked is `0`.
    Checkbox,
    /// Multiple choice: option key -> option key when checked, `0` otherwise.
    Checkboxes { options: Vec<String> },
    /// A nested repeatable group.
    Group { group: Box<Template> },
}

impl FieldKind {
    /// Value a freshly added (padding) delta starts with.
    #[must_use]
    pub fn empty_value(&self) -> Value {
        match self {
            FieldKind::Text | FieldKind::Number | FieldKind::Select { .. } => {
                Value::String(String::new())
            }
            FieldKind::Checkbox => Value::Int(0),
            FieldKind::Checkboxes { options } => Value::Map(
                options
                    .iter()
                    .map(|option| (option.clone(), Value::Int(0)))
                    .collect(),
            ),
            FieldKind::Group { .. } => Value::Array(Vec::new()),
        }
    }

    /// Whether `value` carries no user input for a field of this kind.
    ///
    /// Only `null` and `""` are blank for text-like kinds: `"0"` and
    /// `"FALSE"` are real values. Checkbox kinds also treat their unchecked
    /// sentinels (`0`, `false`) as blank. Containers are blank when every
    /// leaf inside them is.
    #[must_use]
    pub fn is_empty_leaf(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Int(0) | Value::Bool(false) => self.is_checkable(),
            Value::Bool(true) | Value::Int(_) | Value::Float(_) => false,
            Value::Array(items) => items.iter().all(|item| self.is_empty_leaf(item)),
            Value::Map(map) => map.values().all(|item| self.is_empty_leaf(item)),
        }
    }

    /// HTML input type used by the renderer for this kind.
    #[must_use]
    pub fn html_type(&self) -> &'static str {
        match self {
            FieldKind::Text => "textfield",
            FieldKind::Number => "number",
            FieldKind::Select { .. } => "select",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Checkboxes { .. } => "checkboxes",
            FieldKind::Group { .. } => "multivalue",
        }
    }

    /// The nested template when this child is a repeatable group.
    #[must_use]
    pub fn as_group(&self) -> Option<&Template> {
        match self {
            FieldKind::Group { group } => Some(group),
            _ => None,
        }
    }

    fn is_checkable(&self) -> bool {
        matches!(self, FieldKind::Checkbox | FieldKind::Checkboxes { .. })
    }
}

/// One field repeated in every delta of a control.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChildField {
    /// Key of the field inside a delta record.
    pub name: String,
    /// Human-readable label.
    #[serde(default)]
    pub title: String,
    /// Explicit required flag. `None` means the author did not say.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    /// Value used for padding deltas instead of the kind's empty value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl ChildField {
    /// Creates a child of the given kind with no title or flags.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    #[must_use]
    pub fn checkboxes(name: impl Into<String>, options: &[&str]) -> Self {
        let options = options.iter().map(ToString::to_string).collect();
        Self::new(name, FieldKind::Checkboxes { options })
    }

    #[must_use]
    pub fn group(name: impl Into<String>, template: Template) -> Self {
        Self::new(
            name,
            FieldKind::Group {
                group: Box::new(template),
            },
        )
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Value this child starts with in a padding delta.
    #[must_use]
    pub fn default_value(&self) -> Value {
        self.default_value
            .clone()
            .unwrap_or_else(|| self.kind.empty_value())
    }
}

/// Declarative description of one multi-value control instance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Template {
    /// The control's own key within its parent container.
    pub name: String,
    /// Keys of the enclosing containers, outermost first.
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub title: String,
    /// Fields repeated in every delta, in display order.
    pub children: Vec<ChildField>,
    #[serde(default)]
    pub cardinality: Cardinality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub required: bool,
    /// Overrides the configured "add more" button label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_more_label: Option<String>,
}

impl Template {
    /// Creates an unlimited, optional template with no children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: ChildField) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    #[must_use]
    pub fn with_parents<I, S>(mut self, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents = parents.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&ChildField> {
        self.children.iter().find(|child| child.name == name)
    }

    /// The only child when the template has exactly one, enabling the
    /// scalar shorthand in defaults.
    #[must_use]
    pub fn single_child(&self) -> Option<&ChildField> {
        match self.children.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Whether deltas carry a weight and can be reordered.
    #[must_use]
    pub fn is_orderable(&self) -> bool {
        self.cardinality != Cardinality::limited(1)
    }

    /// A record holding every child's padding value.
    #[must_use]
    pub fn empty_record(&self) -> Record {
        self.children
            .iter()
            .map(|child| (child.name.clone(), child.default_value()))
            .collect()
    }
}
