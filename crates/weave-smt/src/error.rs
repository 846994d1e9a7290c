//! Error types for proof verification.

use thiserror::Error;

/// Errors that can occur while checking a state proof.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmtError {
    /// The sibling path does not have exactly one entry per tree level.
    #[error("malformed proof: expected 256 siblings, got {siblings}")]
    MalformedProof { siblings: usize },

    /// The recomputed root differs from the claimed root.
    #[error("proof mismatch: claimed root {claimed}, computed {computed}")]
    ProofMismatch { claimed: String, computed: String },

    /// The balance field of a state-proof response is not a valid u128.
    #[error("invalid balance: {0}")]
    InvalidBalance(String),

    /// A hex field could not be decoded.
    #[error("core error: {0}")]
    Core(#[from] weave_core::CoreError),

    /// The JSON response could not be parsed.
    #[error("json error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for SmtError {
    fn from(e: serde_json::Error) -> Self {
        SmtError::Json(e.to_string())
    }
}

/// Result type for proof operations.
pub type Result<T> = std::result::Result<T, SmtError>;
