//! Knot: a signed state transition over one or more threads.
//!
//! A knot is immutable once signed. Changing any field changes its id and
//! invalidates the signature, so edits always mean building a new knot.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use weave_core::{
    Address, Blake3Hash, Ed25519PublicKey, Ed25519Signature, KnotId, LoomId, Reader, TokenId,
    Writer,
};

use crate::error::{KnotError, Result};

/// Current Unix time in seconds.
pub fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| KnotError::Clock(e.to_string()))
}

/// Wire tag of a knot. The numeric values are a ledger contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum KnotType {
    Transfer = 0,
    NameRegistration = 1,
    TokenDefinition = 2,
    TokenMint = 3,
    TokenBurn = 4,
    LoomDeploy = 5,
    LoomBytecodeUpload = 6,
}

impl KnotType {
    /// Convert to the wire tag.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse a wire tag.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Transfer),
            1 => Some(Self::NameRegistration),
            2 => Some(Self::TokenDefinition),
            3 => Some(Self::TokenMint),
            4 => Some(Self::TokenBurn),
            5 => Some(Self::LoomDeploy),
            6 => Some(Self::LoomBytecodeUpload),
            _ => None,
        }
    }

    /// Check if this kind touches token supply or balances.
    pub fn is_token(self) -> bool {
        matches!(
            self,
            Self::Transfer | Self::TokenDefinition | Self::TokenMint | Self::TokenBurn
        )
    }

    /// Check if this kind concerns a loom.
    pub fn is_loom(self) -> bool {
        matches!(self, Self::LoomDeploy | Self::LoomBytecodeUpload)
    }
}

/// A thread's state before the knot is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantState {
    /// Address of the thread.
    pub thread_id: Address,
    /// Owner of the thread.
    pub pubkey: Ed25519PublicKey,
    /// Caller-supplied state fields (empty for single-party builders).
    pub state: Bytes,
}

impl ParticipantState {
    /// Entry for the thread owned by `pubkey`, with no extra state.
    pub fn for_owner(pubkey: Ed25519PublicKey) -> Self {
        Self {
            thread_id: Address::from_public_key(&pubkey),
            pubkey,
            state: Bytes::new(),
        }
    }

    pub fn with_state(mut self, state: impl Into<Bytes>) -> Self {
        self.state = state.into();
        self
    }

    pub fn encode(&self, w: &mut Writer) {
        w.write_fixed_bytes(self.thread_id.as_bytes())
            .write_fixed_bytes(self.pubkey.as_bytes())
            .write_bytes(&self.state);
    }

    pub fn decode(r: &mut Reader<'_>) -> Result<Self> {
        Ok(Self {
            thread_id: Address::from_bytes(r.read_array()?),
            pubkey: Ed25519PublicKey::from_bytes(r.read_array()?),
            state: Bytes::copy_from_slice(r.read_bytes()?),
        })
    }
}

/// Kind-specific fields of a knot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KnotPayload {
    Transfer {
        to: Address,
        token_id: TokenId,
        amount: u128,
        memo: Option<String>,
    },
    NameRegistration {
        name: String,
        owner: Address,
    },
    TokenDefinition {
        name: String,
        symbol: String,
        decimals: u8,
        max_supply: u128,
        initial_supply: u128,
    },
    TokenMint {
        token_id: TokenId,
        to: Address,
        amount: u128,
    },
    TokenBurn {
        token_id: TokenId,
        amount: u128,
    },
    LoomDeploy {
        name: String,
        operator: Ed25519PublicKey,
        config: Option<Bytes>,
    },
    LoomBytecodeUpload {
        loom_id: LoomId,
        bytecode: Bytes,
        init_msg: Option<Bytes>,
    },
}

impl KnotPayload {
    pub fn kind(&self) -> KnotType {
        match self {
            Self::Transfer { .. } => KnotType::Transfer,
            Self::NameRegistration { .. } => KnotType::NameRegistration,
            Self::TokenDefinition { .. } => KnotType::TokenDefinition,
            Self::TokenMint { .. } => KnotType::TokenMint,
            Self::TokenBurn { .. } => KnotType::TokenBurn,
            Self::LoomDeploy { .. } => KnotType::LoomDeploy,
            Self::LoomBytecodeUpload { .. } => KnotType::LoomBytecodeUpload,
        }
    }

    pub fn encode(&self, w: &mut Writer) {
        match self {
            Self::Transfer {
                to,
                token_id,
                amount,
                memo,
            } => {
                w.write_fixed_bytes(to.as_bytes())
                    .write_fixed_bytes(token_id.as_bytes())
                    .write_u128(*amount)
                    .write_option_string(memo.as_deref());
            }
            Self::NameRegistration { name, owner } => {
                w.write_string(name).write_fixed_bytes(owner.as_bytes());
            }
            Self::TokenDefinition {
                name,
                symbol,
                decimals,
                max_supply,
                initial_supply,
            } => {
                w.write_string(name)
                    .write_string(symbol)
                    .write_u8(*decimals)
                    .write_u128(*max_supply)
                    .write_u128(*initial_supply);
            }
            Self::TokenMint {
                token_id,
                to,
                amount,
            } => {
                w.write_fixed_bytes(token_id.as_bytes())
                    .write_fixed_bytes(to.as_bytes())
                    .write_u128(*amount);
            }
            Self::TokenBurn { token_id, amount } => {
                w.write_fixed_bytes(token_id.as_bytes()).write_u128(*amount);
            }
            Self::LoomDeploy {
                name,
                operator,
                config,
            } => {
                w.write_string(name)
                    .write_fixed_bytes(operator.as_bytes())
                    .write_option_bytes(config.as_deref());
            }
            Self::LoomBytecodeUpload {
                loom_id,
                bytecode,
                init_msg,
            } => {
                w.write_fixed_bytes(loom_id.as_bytes())
                    .write_bytes(bytecode)
                    .write_option_bytes(init_msg.as_deref());
            }
        }
    }

    pub fn decode(kind: KnotType, r: &mut Reader<'_>) -> Result<Self> {
        let payload = match kind {
            KnotType::Transfer => Self::Transfer {
                to: Address::from_bytes(r.read_array()?),
                token_id: TokenId::from_bytes(r.read_array()?),
                amount: r.read_u128()?,
                memo: r.read_option_string()?,
            },
            KnotType::NameRegistration => Self::NameRegistration {
                name: r.read_string()?,
                owner: Address::from_bytes(r.read_array()?),
            },
            KnotType::TokenDefinition => Self::TokenDefinition {
                name: r.read_string()?,
                symbol: r.read_string()?,
                decimals: r.read_u8()?,
                max_supply: r.read_u128()?,
                initial_supply: r.read_u128()?,
            },
            KnotType::TokenMint => Self::TokenMint {
                token_id: TokenId::from_bytes(r.read_array()?),
                to: Address::from_bytes(r.read_array()?),
                amount: r.read_u128()?,
            },
            KnotType::TokenBurn => Self::TokenBurn {
                token_id: TokenId::from_bytes(r.read_array()?),
                amount: r.read_u128()?,
            },
            KnotType::LoomDeploy => Self::LoomDeploy {
                name: r.read_string()?,
                operator: Ed25519PublicKey::from_bytes(r.read_array()?),
                config: r.read_option_bytes()?.map(Bytes::copy_from_slice),
            },
            KnotType::LoomBytecodeUpload => Self::LoomBytecodeUpload {
                loom_id: LoomId::from_bytes(r.read_array()?),
                bytecode: Bytes::copy_from_slice(r.read_bytes()?),
                init_msg: r.read_option_bytes()?.map(Bytes::copy_from_slice),
            },
        };
        Ok(payload)
    }
}

/// A complete, signed knot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Knot {
    /// Blake3 hash of the body.
    pub id: KnotId,
    /// Creation time, Unix seconds.
    pub timestamp: u64,
    /// Optional deadline, Unix seconds.
    pub expiry: Option<u64>,
    /// Threads mutated by this knot, in signature-significant order.
    pub before_states: Vec<ParticipantState>,
    /// Kind-specific fields.
    pub payload: KnotPayload,
    /// Ed25519 signature over `id || body`.
    pub signature: Ed25519Signature,
    /// Public key that produced `signature`.
    pub signer: Ed25519PublicKey,
}

impl Knot {
    pub fn knot_type(&self) -> KnotType {
        self.payload.kind()
    }

    /// Encode the body: every field between the id slot and the signature.
    pub fn body_bytes(&self) -> Vec<u8> {
        encode_body(
            self.timestamp,
            self.expiry,
            &self.before_states,
            &self.payload,
        )
    }

    /// Compute the content id from the body.
    pub fn compute_id(&self) -> KnotId {
        KnotId::from(Blake3Hash::hash(&self.body_bytes()))
    }

    /// Full wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let body = self.body_bytes();
        let mut w = Writer::with_capacity(32 + body.len() + 96);
        w.write_fixed_bytes(self.id.as_bytes())
            .write_fixed_bytes(&body)
            .write_fixed_bytes(self.signature.as_bytes())
            .write_fixed_bytes(self.signer.as_bytes());
        w.into_vec()
    }

    /// Lowercase hex of the wire bytes, no prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Decode wire bytes. Trailing bytes are rejected.
    ///
    /// Decoding does not verify; call [`Knot::verify`] on untrusted input.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        let id = KnotId::from_bytes(r.read_array()?);
        let tag = r.read_u8()?;
        let kind = KnotType::from_u8(tag).ok_or(KnotError::InvalidKnotType(tag))?;
        let timestamp = r.read_u64()?;
        let expiry = r.read_option_u64()?;

        let count = r.read_u32()?;
        let mut before_states = Vec::new();
        for _ in 0..count {
            before_states.push(ParticipantState::decode(&mut r)?);
        }

        let payload = KnotPayload::decode(kind, &mut r)?;
        let signature = Ed25519Signature::from_bytes(r.read_array()?);
        let signer = Ed25519PublicKey::from_bytes(r.read_array()?);
        r.finish()?;

        Ok(Self {
            id,
            timestamp,
            expiry,
            before_states,
            payload,
            signature,
            signer,
        })
    }

    /// Decode from hex (optional `0x` prefix).
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = weave_core::hexutil::decode("knot", s)?;
        Self::decode(&bytes)
    }

    /// Check the id, the signature, and that the signer owns a participant thread.
    pub fn verify(&self) -> Result<()> {
        let body = self.body_bytes();
        let computed = KnotId::from(Blake3Hash::hash(&body));
        if computed != self.id {
            return Err(KnotError::IdMismatch {
                stored: self.id.to_hex(),
                computed: computed.to_hex(),
            });
        }

        self.signer
            .verify(&signing_message(&self.id, &body), &self.signature)
            .map_err(|_| KnotError::SignatureInvalid)?;

        let signer_thread = Address::from_public_key(&self.signer);
        let owns_thread = self
            .before_states
            .iter()
            .any(|p| p.pubkey == self.signer && p.thread_id == signer_thread);
        if !owns_thread {
            return Err(KnotError::SignerNotParticipant {
                signer: self.signer.to_hex(),
            });
        }
        Ok(())
    }

    /// Whether the knot's deadline has passed at `now` (Unix seconds).
    pub fn is_expired(&self, now: u64) -> bool {
        self.expiry.is_some_and(|deadline| now > deadline)
    }

    /// Loom id assigned by this knot, if it is a deployment.
    pub fn loom_id(&self) -> Option<LoomId> {
        match self.payload {
            KnotPayload::LoomDeploy { .. } => Some(LoomId::from(self.id)),
            _ => None,
        }
    }
}

/// Participant count for the `u32` prefix of `before_states`.
pub(crate) fn participant_count(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        KnotError::params(
            "before_states",
            format!("{len} participants exceed the u32 count prefix"),
        )
    })
}

/// # Panics
///
/// Panics if `before_states` holds more than `u32::MAX` entries.
/// [`KnotBuilder::sign`](crate::KnotBuilder::sign) rejects those before
/// encoding, and decoding can never produce them.
pub(crate) fn encode_body(
    timestamp: u64,
    expiry: Option<u64>,
    before_states: &[ParticipantState],
    payload: &KnotPayload,
) -> Vec<u8> {
    let count = participant_count(before_states.len()).unwrap_or_else(|e| panic!("{e}"));
    let mut w = Writer::with_capacity(128);
    w.write_u8(payload.kind().to_u8())
        .write_u64(timestamp)
        .write_option_u64(expiry)
        .write_u32(count);
    for state in before_states {
        state.encode(&mut w);
    }
    payload.encode(&mut w);
    w.into_vec()
}

/// Message signed for a knot: `id || body`.
pub(crate) fn signing_message(id: &KnotId, body: &[u8]) -> Vec<u8> {
    let mut msg = Vec::with_capacity(32 + body.len());
    msg.extend_from_slice(id.as_bytes());
    msg.extend_from_slice(body);
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_knot_type_roundtrip() {
        for kind in [
            KnotType::Transfer,
            KnotType::NameRegistration,
            KnotType::TokenDefinition,
            KnotType::TokenMint,
            KnotType::TokenBurn,
            KnotType::LoomDeploy,
            KnotType::LoomBytecodeUpload,
        ] {
            assert_eq!(KnotType::from_u8(kind.to_u8()), Some(kind));
        }
        assert_eq!(KnotType::from_u8(7), None);
    }

    #[test]
    fn test_knot_type_tags_are_fixed() {
        assert_eq!(KnotType::Transfer.to_u8(), 0);
        assert_eq!(KnotType::NameRegistration.to_u8(), 1);
        assert_eq!(KnotType::TokenDefinition.to_u8(), 2);
        assert_eq!(KnotType::TokenMint.to_u8(), 3);
        assert_eq!(KnotType::TokenBurn.to_u8(), 4);
        assert_eq!(KnotType::LoomDeploy.to_u8(), 5);
        assert_eq!(KnotType::LoomBytecodeUpload.to_u8(), 6);
    }

    #[test]
    fn test_knot_type_categories() {
        assert!(KnotType::Transfer.is_token());
        assert!(KnotType::TokenBurn.is_token());
        assert!(!KnotType::NameRegistration.is_token());
        assert!(KnotType::LoomDeploy.is_loom());
        assert!(!KnotType::TokenMint.is_loom());
    }

    #[test]
    fn test_participant_layout() {
        let p = ParticipantState::for_owner(Ed25519PublicKey::from_bytes([9; 32]));
        let mut w = Writer::new();
        p.encode(&mut w);
        let bytes = w.into_vec();
        assert_eq!(bytes.len(), 20 + 32 + 4);
        assert_eq!(&bytes[..20], p.thread_id.as_bytes());

        let mut r = Reader::new(&bytes);
        assert_eq!(ParticipantState::decode(&mut r).unwrap(), p);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn test_transfer_payload_layout() {
        let payload = KnotPayload::Transfer {
            to: Address::from_bytes([2; 20]),
            token_id: TokenId::NATIVE,
            amount: 5,
            memo: None,
        };
        let mut w = Writer::new();
        payload.encode(&mut w);
        let bytes = w.into_vec();
        assert_eq!(bytes.len(), 20 + 32 + 16 + 1);
        assert_eq!(bytes[52], 5);
        assert_eq!(*bytes.last().unwrap(), 0);
    }

    #[test]
    fn test_body_starts_with_type_and_timestamp() {
        let payload = KnotPayload::TokenBurn {
            token_id: TokenId::from_bytes([1; 32]),
            amount: 1,
        };
        let body = encode_body(0x0102, Some(9), &[], &payload);
        assert_eq!(body[0], KnotType::TokenBurn.to_u8());
        assert_eq!(&body[1..9], &0x0102u64.to_le_bytes());
        assert_eq!(body[9], 1);
        assert_eq!(&body[10..18], &9u64.to_le_bytes());
        assert_eq!(&body[18..22], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_participant_count_never_clamps() {
        assert_eq!(participant_count(0).unwrap(), 0);
        assert_eq!(participant_count(u32::MAX as usize).unwrap(), u32::MAX);
        if let Some(over) = (u32::MAX as usize).checked_add(1) {
            assert!(matches!(
                participant_count(over),
                Err(KnotError::InvalidParams { field: "before_states", .. })
            ));
        }
    }

    #[test]
    fn test_expiry() {
        let knot = Knot {
            id: KnotId::ZERO,
            timestamp: 100,
            expiry: Some(200),
            before_states: vec![],
            payload: KnotPayload::TokenBurn {
                token_id: TokenId::NATIVE,
                amount: 1,
            },
            signature: Ed25519Signature::ZERO,
            signer: Ed25519PublicKey::from_bytes([0; 32]),
        };
        assert!(!knot.is_expired(200));
        assert!(knot.is_expired(201));

        let open = Knot {
            expiry: None,
            ..knot
        };
        assert!(!open.is_expired(u64::MAX));
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let mut bytes = vec![0u8; 32];
        bytes.push(0xee);
        assert!(matches!(
            Knot::decode(&bytes),
            Err(KnotError::InvalidKnotType(0xee))
        ));
    }

    #[test]
    fn test_decode_rejects_truncation() {
        assert!(matches!(
            Knot::decode(&[0u8; 10]),
            Err(KnotError::Core(weave_core::CoreError::Truncated { .. }))
        ));
    }
}
