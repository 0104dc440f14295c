//! Session-scoped form state carried across round-trips.
//!
//! The only thing a multi-value control remembers between requests is how
//! many deltas it rendered. Those counts live in a [`FormState`] that the
//! processor threads through one request and hands back to the client as an
//! opaque token (`MsgPack`, then URL-safe base64). Nothing is shared between
//! sessions or forms.

use std::collections::BTreeMap;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::address::ControlPath;
use crate::error::FormError;

/// Remembered state of one rendered control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlState {
    pub path: ControlPath,
    /// Number of deltas rendered in the last response.
    pub count: usize,
}

/// Per-session state of one form, keyed by control element name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormState {
    form_id: String,
    controls: BTreeMap<String, ControlState>,
}

impl FormState {
    /// Creates an empty state for the given form.
    #[must_use]
    pub fn new(form_id: impl Into<String>) -> Self {
        Self {
            form_id: form_id.into(),
            controls: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    /// Count rendered for `path` in the last response, if it was rendered.
    #[must_use]
    pub fn count(&self, path: &ControlPath) -> Option<usize> {
        self.controls.get(&path.key()).map(|control| control.count)
    }

    /// Records the count rendered for `path` in this response.
    pub fn set_count(&mut self, path: &ControlPath, count: usize) {
        self.controls.insert(
            path.key(),
            ControlState {
                path: path.clone(),
                count,
            },
        );
    }

    /// Every control rendered in the last response.
    pub fn controls(&self) -> impl Iterator<Item = &ControlState> {
        self.controls.values()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Serializes the state into an opaque token for the next round-trip.
    ///
    /// # Errors
    ///
    /// Returns `FormError::TokenEncode` if `MsgPack` serialization fails.
    pub fn encode(&self) -> Result<String, FormError> {
        let bytes = rmp_serde::to_vec_named(self)?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }

    /// Restores the state of `form_id` from a token produced by [`encode`].
    ///
    /// # Errors
    ///
    /// Returns `FormError::TokenEncoding` or `FormError::TokenDecode` for a
    /// malformed token, and `FormError::FormMismatch` when the token was
    /// issued for another form.
    ///
    /// [`encode`]: FormState::encode
    pub fn decode(token: &str, form_id: &str) -> Result<Self, FormError> {
        let bytes = URL_SAFE_NO_PAD.decode(token.trim())?;
        let state: FormState = rmp_serde::from_slice(&bytes)?;
        if state.form_id != form_id {
            return Err(FormError::FormMismatch {
                expected: form_id.to_string(),
                found: state.form_id,
            });
        }
        Ok(state)
    }
}
