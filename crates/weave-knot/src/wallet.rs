//! Wallet: one Ed25519 keypair and the identity derived from it.

use std::fmt;

use weave_core::{hexutil, Address, CoreError, Ed25519PublicKey, Ed25519Signature, Keypair};

use crate::error::Result;
use crate::knot::ParticipantState;

/// Owns exactly one signing key.
///
/// The public key and address are computed once at construction. Signing
/// only reads the key, so a shared `&Wallet` can sign from many threads.
/// Not `Clone`: key material should have a single owner.
pub struct Wallet {
    keypair: Keypair,
    public_key: Ed25519PublicKey,
    address: Address,
}

impl Wallet {
    fn from_keypair(keypair: Keypair) -> Self {
        let public_key = keypair.public_key();
        let address = Address::from_public_key(&public_key);
        Self {
            keypair,
            public_key,
            address,
        }
    }

    /// Build from a raw 32-byte private key.
    pub fn from_private_key(private_key: &[u8]) -> Result<Self> {
        Ok(Self::from_keypair(Keypair::from_slice(private_key)?))
    }

    /// Build from a hex private key, with or without a `0x` prefix.
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let bytes = hexutil::decode("private key", private_key)?;
        if bytes.len() != 32 {
            return Err(CoreError::InvalidKeyLength {
                expected: 32,
                got: bytes.len(),
            }
            .into());
        }
        Self::from_private_key(&bytes)
    }

    /// Generate a fresh wallet from OS entropy.
    pub fn generate() -> Self {
        Self::from_keypair(Keypair::generate())
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.public_key
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The raw private key. Callers own its storage policy.
    pub fn private_key(&self) -> [u8; 32] {
        self.keypair.seed()
    }

    /// Sign an arbitrary message.
    pub fn sign(&self, message: &[u8]) -> Ed25519Signature {
        self.keypair.sign(message)
    }

    /// Verify a signature made by this wallet.
    pub fn verify(&self, message: &[u8], signature: &Ed25519Signature) -> Result<()> {
        Ok(self.public_key.verify(message, signature)?)
    }

    /// This wallet's own thread entry, with no extra state.
    pub fn participant(&self) -> ParticipantState {
        ParticipantState::for_owner(self.public_key)
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
