//! Error types for the Weave Core.

use thiserror::Error;

/// Core errors raised by the codec and the primitive wrappers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid key length: expected {expected} bytes, got {got}")]
    InvalidKeyLength { expected: usize, got: usize },

    #[error("truncated input: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("invalid utf-8 in string field")]
    InvalidUtf8,

    #[error("invalid option flag: {0:#04x}")]
    InvalidOptionFlag(u8),

    #[error("invalid hex in {field}: {reason}")]
    InvalidHex { field: &'static str, reason: String },

    #[error("invalid length for {field}: expected {expected} bytes, got {got}")]
    InvalidLength {
        field: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("invalid public key")]
    InvalidPublicKey,

    #[error("signature verification failed")]
    SignatureInvalid,
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
