//! Multi-value control core: value normalization, delta counting, weight
//! ordering, submission reduction and required-field propagation.
//!
//! Everything here is a pure function of a [`Template`] and values; the
//! session-scoped delta count is owned by the caller.

pub mod count;
pub mod delta;
pub mod normalize;
pub mod reduce;
pub mod required;
pub mod template;
pub mod types;
pub mod weight;

pub use count::{materialize, resolve_count, truncate_to_cardinality, Trigger};
pub use delta::DeltaList;
pub use normalize::{normalize, RawInput};
pub use reduce::{is_empty_delta, reduce_submission};
pub use required::is_child_required;
pub use template::{Cardinality, ChildField, FieldKind, Template, CARDINALITY_UNLIMITED};
pub use types::{Record, Value};
pub use weight::{default_weight, reorder, reorder_indexed, weight_range};
