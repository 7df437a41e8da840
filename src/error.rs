// Error taxonomy for the collection and retrieval paths.
//
// Callers branch on the kind: the background collector logs and skips every
// variant, while user-facing retrieval turns each one into a polite reply.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StickerError {
    /// No LLM provider is configured or currently selected.
    #[error("no LLM provider is available")]
    ProviderUnavailable,

    /// The provider call itself failed (transport, HTTP status, empty reply).
    #[error("LLM provider request failed: {0}")]
    Provider(String),

    /// The provider did not answer within the configured timeout.
    #[error("LLM provider did not answer within {0:?}")]
    Timeout(Duration),

    /// The classifier reply could not be turned into a Verdict.
    #[error("malformed classifier response: {reason}")]
    MalformedResponse { reason: String, raw: String },

    /// Any fault in the sticker database.
    #[error("sticker storage unavailable: {0}")]
    StorageFault(#[from] rusqlite::Error),
}

impl StickerError {
    pub(crate) fn malformed(reason: impl Into<String>, raw: &str) -> Self {
        StickerError::MalformedResponse {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }
}

pub type Result<T, E = StickerError> = std::result::Result<T, E>;
