//! Error type for the Weave facade.

use thiserror::Error;

use weave_core::CoreError;
use weave_crypt::CryptError;
use weave_knot::KnotError;
use weave_smt::SmtError;

/// Errors that can occur through the [`Weave`](crate::Weave) API.
#[derive(Debug, Error)]
pub enum WeaveError {
    /// Codec, hex, or key error.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// State proof error.
    #[error("proof error: {0}")]
    Proof(#[from] SmtError),

    /// Knot construction, decoding, or confirmation error.
    #[error("knot error: {0}")]
    Knot(#[from] KnotError),

    /// Encryption or chat event error.
    #[error("crypt error: {0}")]
    Crypt(#[from] CryptError),
}

impl WeaveError {
    /// Whether this is a bounded wait that ran out, which callers may retry.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WeaveError::Knot(KnotError::ConfirmationTimeout { .. }))
    }
}

/// Result type for Weave operations.
pub type Result<T> = std::result::Result<T, WeaveError>;
