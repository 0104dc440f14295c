//! Multi-value form controls: addressing, session state, trigger
//! classification, render plans and submission, on top of the
//! `multivalue-core` value engine.

pub mod address;
pub mod cli;
pub mod config;
pub mod control;
pub mod error;
pub mod logging;
pub mod processor;
pub mod render;
pub mod state;
pub mod trigger;

pub use address::{clean_id, ControlPath};
pub use config::FormConfig;
pub use control::MultiValueControl;
pub use error::{ClassifyError, FormError};
pub use processor::{FormDefinition, FormProcessor, FormRequest, FormResponse};
pub use render::{RenderedButton, RenderedChild, RenderedControl, RenderedDelta, RenderedWeight};
pub use state::{ControlState, FormState};
pub use trigger::{classify, FormTrigger};
