//! Trigger classification: triggering element name -> [`FormTrigger`].

use multivalue_core::Trigger;

use crate::address::ControlPath;
use crate::config::FormConfig;
use crate::error::ClassifyError;

/// What fired the current request, at form level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormTrigger {
    /// First render, or a rebuild not caused by any control.
    None,
    /// A button of one control ("add more" or a delta's remove button).
    Control { key: String, trigger: Trigger },
    /// Final submission.
    Submit,
}

impl FormTrigger {
    /// The trigger as seen by the control at `path`: actions aimed at other
    /// controls are plain rebuilds.
    #[must_use]
    pub fn for_control(&self, path: &ControlPath) -> Trigger {
        match self {
            FormTrigger::Control { key, trigger } if *key == path.key() => *trigger,
            FormTrigger::Control { .. } | FormTrigger::None => Trigger::None,
            FormTrigger::Submit => Trigger::Submit,
        }
    }
}

/// Classifies the triggering element of a posted request.
///
/// `controls` lists the controls that could own the button, with the number
/// of deltas each rendered (remove buttons exist only for those deltas). A
/// missing element name is a submission (e.g. the form was sent with the
/// enter key).
///
/// # Errors
///
/// Returns `ClassifyError::UnknownTrigger` when the name matches neither a
/// submit button nor a button of the given controls.
pub fn classify<'a, I>(
    config: &FormConfig,
    controls: I,
    element: Option<&str>,
) -> Result<FormTrigger, ClassifyError>
where
    I: IntoIterator<Item = (&'a ControlPath, usize)>,
{
    let Some(name) = element else {
        return Ok(FormTrigger::Submit);
    };
    if config.is_submit_button(name) {
        return Ok(FormTrigger::Submit);
    }

    for (path, count) in controls {
        if name == path.add_more_button() {
            return Ok(FormTrigger::Control {
                key: path.key(),
                trigger: Trigger::AddMore,
            });
        }
        if let Some(delta) = path.parse_remove_button(name).filter(|delta| *delta < count) {
            return Ok(FormTrigger::Control {
                key: path.key(),
                trigger: Trigger::Remove { delta },
            });
        }
    }

    Err(ClassifyError::UnknownTrigger {
        name: name.to_string(),
    })
}
