//! Error types for encryption and chat events.

use thiserror::Error;

/// Errors that can occur during encryption, key agreement, or event handling.
#[derive(Debug, Error)]
pub enum CryptError {
    /// Key length, hex, or codec failure from the core primitives.
    #[error("core error: {0}")]
    Core(#[from] weave_core::CoreError),

    /// The AEAD refused to encrypt.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Authentication tag mismatch: wrong key, wrong nonce, or tampered data.
    #[error("decryption failed")]
    DecryptionFailed,

    /// A value that has no canonical encoding (floats, tags, ...).
    #[error("cannot canonicalize {0}")]
    NonCanonical(&'static str),

    /// Stored event id differs from the hash of its canonical form.
    #[error("event id mismatch: stored {stored}, computed {computed}")]
    IdMismatch { stored: String, computed: String },

    /// Event signature does not verify against its pubkey.
    #[error("event signature invalid")]
    SignatureInvalid,

    /// System clock is before the Unix epoch.
    #[error("clock error: {0}")]
    Clock(String),

    /// JSON shape error.
    #[error("json error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for CryptError {
    fn from(e: serde_json::Error) -> Self {
        CryptError::Json(e.to_string())
    }
}

/// Result type for encryption operations.
pub type Result<T> = std::result::Result<T, CryptError>;
