use crate::template::Template;

/// Whether `child_name` must be filled in at `delta`.
///
/// Only the first delta of a required control is constrained. When any
/// child declares its own `required` flag, exactly those flags apply to the
/// first delta; otherwise every child of the first delta is required. A
/// control that is not required never forces a child, whatever the child
/// declares: single-field validation handles that flag on its own.
#[must_use]
pub fn is_child_required(template: &Template, child_name: &str, delta: usize) -> bool {
    if !template.required || delta != 0 {
        return false;
    }
    let Some(child) = template.child(child_name) else {
        return false;
    };
    let any_explicit = template.children.iter().any(|c| c.required.is_some());
    if any_explicit {
        child.required.unwrap_or(false)
    } else {
        true
    }
}
