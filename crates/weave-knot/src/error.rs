//! Error types for knot construction and verification.

use thiserror::Error;

use crate::amount::AmountError;

/// Errors that can occur while building, decoding, or confirming knots.
#[derive(Debug, Error)]
pub enum KnotError {
    /// Codec, key-length, or hex failure from the core primitives.
    #[error("core error: {0}")]
    Core(#[from] weave_core::CoreError),

    /// Amount string could not be parsed.
    #[error("invalid amount: {0}")]
    Amount(#[from] AmountError),

    /// Unknown knot type tag on the wire.
    #[error("unknown knot type: {0}")]
    InvalidKnotType(u8),

    /// Builder parameters rejected before signing.
    #[error("invalid {field}: {reason}")]
    InvalidParams { field: &'static str, reason: String },

    /// Stored id differs from the hash of the knot body.
    #[error("knot id mismatch: stored {stored}, computed {computed}")]
    IdMismatch { stored: String, computed: String },

    /// Signature does not verify against the embedded signer.
    #[error("knot signature invalid")]
    SignatureInvalid,

    /// The signer owns none of the participant threads.
    #[error("signer {signer} is not a participant")]
    SignerNotParticipant { signer: String },

    /// System clock is before the Unix epoch.
    #[error("clock error: {0}")]
    Clock(String),

    /// Bounded confirmation wait exceeded its deadline.
    #[error("confirmation timeout for loom {loom_id} after {attempts} attempts ({waited_ms} ms)")]
    ConfirmationTimeout {
        loom_id: String,
        attempts: u32,
        waited_ms: u64,
    },
}

impl KnotError {
    pub(crate) fn params(field: &'static str, reason: impl Into<String>) -> Self {
        KnotError::InvalidParams {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type for knot operations.
pub type Result<T> = std::result::Result<T, KnotError>;
