//! Message envelopes.
//!
//! [`EncryptedMessage`] is a one-shot sealed box: a fresh ephemeral X25519
//! key per message, so only the recipient can open it and two encryptions
//! of the same plaintext never match. [`SymmetricMessage`] is plain AEAD
//! under a key both sides already hold.
//!
//! Both encode with the ledger codec:
//!
//! ```text
//! EncryptedMessage: ephemeral_pubkey (32) | nonce (24) | ciphertext (bytes)
//! SymmetricMessage: nonce (24) | ciphertext (bytes)
//! ```
//!
//! ## Message key
//!
//! The sealed-box key is not the bare KDF of the ECDH output. Both public
//! keys are appended as KDF input:
//!
//! ```text
//! key = BLAKE3-derive_key(MESSAGE_KEY_CONTEXT,
//!                         ecdh(ephemeral, recipient) || ephemeral_pub || recipient_pub)
//! ```
//!
//! with [`MESSAGE_KEY_CONTEXT`] as the context string. Any other
//! implementation must derive exactly this key to interoperate.

use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use x25519_dalek::{EphemeralSecret, PublicKey};

use weave_core::{Reader, Writer};

use crate::crypto::{
    EncryptionKey, EncryptionNonce, SharedKey, X25519PublicKey, X25519StaticSecret,
    MESSAGE_KEY_CONTEXT,
};
use crate::error::Result;

/// A message sealed to one recipient's X25519 key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedMessage {
    /// Sender's one-time public key.
    pub ephemeral_pubkey: X25519PublicKey,
    pub nonce: EncryptionNonce,
    /// Ciphertext with the Poly1305 tag appended.
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(32 + 24 + 4 + self.ciphertext.len());
        w.write_fixed_bytes(self.ephemeral_pubkey.as_bytes())
            .write_fixed_bytes(self.nonce.as_bytes())
            .write_bytes(&self.ciphertext);
        w.into_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        let message = Self {
            ephemeral_pubkey: X25519PublicKey::from_bytes(r.read_array()?),
            nonce: EncryptionNonce::from_bytes(r.read_array()?),
            ciphertext: r.read_bytes()?.to_vec(),
        };
        r.finish()?;
        Ok(message)
    }
}

/// A message under a caller-held symmetric key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymmetricMessage {
    pub nonce: EncryptionNonce,
    #[serde(with = "hex_bytes")]
    pub ciphertext: Vec<u8>,
}

impl SymmetricMessage {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::with_capacity(24 + 4 + self.ciphertext.len());
        w.write_fixed_bytes(self.nonce.as_bytes())
            .write_bytes(&self.ciphertext);
        w.into_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        let message = Self {
            nonce: EncryptionNonce::from_bytes(r.read_array()?),
            ciphertext: r.read_bytes()?.to_vec(),
        };
        r.finish()?;
        Ok(message)
    }
}

/// Sealed-box key: see the module docs for the exact derivation.
fn message_key(
    shared: &SharedKey,
    ephemeral: &X25519PublicKey,
    recipient: &X25519PublicKey,
) -> EncryptionKey {
    let mut info = [0u8; 64];
    info[..32].copy_from_slice(ephemeral.as_bytes());
    info[32..].copy_from_slice(recipient.as_bytes());
    shared.derive_encryption_key(MESSAGE_KEY_CONTEXT, &info)
}

/// Seal `plaintext` to `recipient`.
pub fn encrypt(recipient: &X25519PublicKey, plaintext: &[u8]) -> Result<EncryptedMessage> {
    let ephemeral = EphemeralSecret::random_from_rng(OsRng);
    let ephemeral_pubkey = X25519PublicKey::from(PublicKey::from(&ephemeral));
    let shared = ephemeral.diffie_hellman(&PublicKey::from(*recipient.as_bytes()));
    let key = message_key(
        &SharedKey::from_bytes(*shared.as_bytes()),
        &ephemeral_pubkey,
        recipient,
    );

    let nonce = EncryptionNonce::generate();
    let ciphertext = key.encrypt(plaintext, &nonce)?;
    Ok(EncryptedMessage {
        ephemeral_pubkey,
        nonce,
        ciphertext,
    })
}

/// Open a message sealed to `recipient`'s public key.
///
/// Any mismatch (wrong recipient, altered nonce, altered ciphertext) is
/// reported as [`CryptError::DecryptionFailed`](crate::CryptError::DecryptionFailed).
pub fn decrypt(recipient: &X25519StaticSecret, message: &EncryptedMessage) -> Result<Vec<u8>> {
    let shared = recipient.diffie_hellman(&message.ephemeral_pubkey);
    let key = message_key(&shared, &message.ephemeral_pubkey, &recipient.public_key());
    key.decrypt(&message.ciphertext, &message.nonce)
}

/// Encrypt under a key both parties hold, e.g. from
/// [`derive_shared_secret`](crate::derive_shared_secret).
pub fn symmetric_encrypt(key: &EncryptionKey, plaintext: &[u8]) -> Result<SymmetricMessage> {
    let nonce = EncryptionNonce::generate();
    let ciphertext = key.encrypt(plaintext, &nonce)?;
    Ok(SymmetricMessage { nonce, ciphertext })
}

pub fn symmetric_decrypt(key: &EncryptionKey, message: &SymmetricMessage) -> Result<Vec<u8>> {
    key.decrypt(&message.ciphertext, &message.nonce)
}

mod hex_bytes {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        weave_core::hexutil::decode("ciphertext", &s).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{derive_shared_secret, ed25519_to_x25519_public, ed25519_to_x25519_secret};
    use crate::error::CryptError;
    use proptest::prelude::*;

    #[test]
    fn test_roundtrip_via_wallet_keys() {
        let recipient_priv = [0x11; 32];
        let recipient_pub = ed25519_to_x25519_public(&recipient_priv).unwrap();

        let sealed = encrypt(&recipient_pub, b"meet at noon").unwrap();
        let secret = ed25519_to_x25519_secret(&recipient_priv).unwrap();
        assert_eq!(decrypt(&secret, &sealed).unwrap(), b"meet at noon");
    }

    #[test]
    fn test_message_key_binds_both_public_keys() {
        let bob = ed25519_to_x25519_secret(&[0x22; 32]).unwrap();
        let sealed = encrypt(&bob.public_key(), b"interop").unwrap();
        let shared = bob.diffie_hellman(&sealed.ephemeral_pubkey);

        let mut material = shared.as_bytes().to_vec();
        material.extend_from_slice(sealed.ephemeral_pubkey.as_bytes());
        material.extend_from_slice(bob.public_key().as_bytes());
        let key = EncryptionKey::from_bytes(weave_core::derive_key(MESSAGE_KEY_CONTEXT, &material));
        assert_eq!(key.decrypt(&sealed.ciphertext, &sealed.nonce).unwrap(), b"interop");

        let bare = EncryptionKey::from_bytes(weave_core::derive_key(
            MESSAGE_KEY_CONTEXT,
            shared.as_bytes(),
        ));
        assert!(bare.decrypt(&sealed.ciphertext, &sealed.nonce).is_err());
    }

    #[test]
    fn test_wrong_recipient_fails() {
        let bob = X25519StaticSecret::generate();
        let eve = X25519StaticSecret::generate();
        let sealed = encrypt(&bob.public_key(), b"for bob").unwrap();
        assert!(matches!(decrypt(&eve, &sealed), Err(CryptError::DecryptionFailed)));
    }

    #[test]
    fn test_encryptions_differ() {
        let bob = X25519StaticSecret::generate();
        let a = encrypt(&bob.public_key(), b"same").unwrap();
        let b = encrypt(&bob.public_key(), b"same").unwrap();
        assert_ne!(a.ephemeral_pubkey, b.ephemeral_pubkey);
        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_tampering_detected() {
        let bob = X25519StaticSecret::generate();
        let sealed = encrypt(&bob.public_key(), b"integrity").unwrap();

        let mut bad = sealed.clone();
        bad.ciphertext[0] ^= 1;
        assert!(matches!(decrypt(&bob, &bad), Err(CryptError::DecryptionFailed)));

        let mut bad = sealed.clone();
        bad.nonce.0[0] ^= 1;
        assert!(matches!(decrypt(&bob, &bad), Err(CryptError::DecryptionFailed)));

        let mut bad = sealed;
        bad.ephemeral_pubkey = X25519StaticSecret::generate().public_key();
        assert!(matches!(decrypt(&bob, &bad), Err(CryptError::DecryptionFailed)));
    }

    #[test]
    fn test_empty_plaintext() {
        let bob = X25519StaticSecret::generate();
        let sealed = encrypt(&bob.public_key(), b"").unwrap();
        assert_eq!(sealed.ciphertext.len(), 16);
        assert!(decrypt(&bob, &sealed).unwrap().is_empty());
    }

    #[test]
    fn test_encrypted_message_codec() {
        let bob = X25519StaticSecret::generate();
        let sealed = encrypt(&bob.public_key(), b"wire").unwrap();
        let bytes = sealed.to_bytes();
        assert_eq!(bytes.len(), 32 + 24 + 4 + 4 + 16);
        assert_eq!(EncryptedMessage::from_bytes(&bytes).unwrap(), sealed);

        let mut long = bytes;
        long.push(0);
        assert!(EncryptedMessage::from_bytes(&long).is_err());
        assert!(EncryptedMessage::from_bytes(&[0u8; 40]).is_err());
    }

    #[test]
    fn test_encrypted_message_json() {
        let bob = X25519StaticSecret::generate();
        let sealed = encrypt(&bob.public_key(), b"json").unwrap();
        let json = serde_json::to_string(&sealed).unwrap();
        assert!(json.contains(&sealed.ephemeral_pubkey.to_hex()));
        let back: EncryptedMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(decrypt(&bob, &back).unwrap(), b"json");
    }

    #[test]
    fn test_symmetric_with_shared_secret() {
        let alice = [0xaa; 32];
        let bob = [0xbb; 32];
        let k_ab = derive_shared_secret(&alice, &ed25519_to_x25519_public(&bob).unwrap()).unwrap();
        let k_ba = derive_shared_secret(&bob, &ed25519_to_x25519_public(&alice).unwrap()).unwrap();

        let msg = symmetric_encrypt(&k_ab, b"hi bob").unwrap();
        let decoded = SymmetricMessage::from_bytes(&msg.to_bytes()).unwrap();
        assert_eq!(symmetric_decrypt(&k_ba, &decoded).unwrap(), b"hi bob");

        assert!(matches!(
            symmetric_decrypt(&EncryptionKey::generate(), &msg),
            Err(CryptError::DecryptionFailed)
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn test_sealed_roundtrip(plaintext in prop::collection::vec(any::<u8>(), 0..512)) {
            let bob = X25519StaticSecret::generate();
            let sealed = encrypt(&bob.public_key(), &plaintext).unwrap();
            prop_assert_eq!(decrypt(&bob, &sealed).unwrap(), plaintext);
        }
    }
}
