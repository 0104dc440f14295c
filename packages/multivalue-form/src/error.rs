/// Errors returned while processing a form request.
///
/// The value engine itself never fails; these cover the round-trip plumbing
/// around it.
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("state token is not valid base64: {0}")]
    TokenEncoding(#[from] base64::DecodeError),
    #[error("state token could not be decoded: {0}")]
    TokenDecode(#[from] rmp_serde::decode::Error),
    #[error("form state could not be encoded: {0}")]
    TokenEncode(#[from] rmp_serde::encode::Error),
    #[error("state token belongs to form {found}, expected {expected}")]
    FormMismatch { expected: String, found: String },
    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// Errors from classifying a triggering element into a trigger.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("unknown triggering element: {name}")]
    UnknownTrigger { name: String },
}
