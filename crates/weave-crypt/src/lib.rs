//! # Weave Crypt
//!
//! Confidentiality and authenticity for data that travels beside the
//! ledger rather than on it.
//!
//! - [`encrypt`] / [`decrypt`]: sealed messages to a wallet's X25519 key
//! - [`derive_shared_secret`] + [`symmetric_encrypt`]: a static key two
//!   wallets can both derive without a round trip
//! - [`ChatEvent`]: content-addressed, Ed25519-signed events
//!
//! X25519 keys are derived from Ed25519 private keys with labeled Blake3
//! KDFs; the signing key is never used for key agreement directly.
//!
//! ```rust
//! use weave_crypt::{decrypt, ed25519_to_x25519_public, ed25519_to_x25519_secret, encrypt};
//!
//! let bob_private = [0x22u8; 32];
//! let bob_public = ed25519_to_x25519_public(&bob_private).unwrap();
//!
//! let sealed = encrypt(&bob_public, b"hello bob").unwrap();
//! let secret = ed25519_to_x25519_secret(&bob_private).unwrap();
//! assert_eq!(decrypt(&secret, &sealed).unwrap(), b"hello bob");
//! ```

pub mod canonical;
pub mod chat;
pub mod crypto;
pub mod envelope;
pub mod error;

pub use canonical::to_canonical_bytes;
pub use chat::{
    canonical_event_bytes, create_chat_event, verify_chat_event, ChatEvent, ChatEventBuilder, Tag,
};
pub use crypto::{
    derive_shared_secret, ed25519_to_x25519_public, ed25519_to_x25519_secret, EncryptionKey,
    EncryptionNonce, SharedKey, X25519PublicKey, X25519StaticSecret,
};
pub use envelope::{
    decrypt, encrypt, symmetric_decrypt, symmetric_encrypt, EncryptedMessage, SymmetricMessage,
};
pub use error::{CryptError, Result};
