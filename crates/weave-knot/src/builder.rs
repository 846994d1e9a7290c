//! Knot construction and signing.
//!
//! [`KnotBuilder`] fixes the field order; the per-kind `build_*` functions
//! validate caller parameters, sign with a [`Wallet`], and return the hex
//! wire payload the node accepts.

use bytes::Bytes;

use weave_core::{Address, Blake3Hash, Ed25519PublicKey, KnotId, LoomId, TokenId, Writer};

use crate::error::{KnotError, Result};
use crate::knot::{
    encode_body, participant_count, signing_message, unix_now, Knot, KnotPayload, ParticipantState,
};
use crate::wallet::Wallet;

const MAX_NAME_LEN: usize = 32;
const MAX_TOKEN_NAME_LEN: usize = 64;
const MAX_SYMBOL_LEN: usize = 12;
const MAX_TOKEN_DECIMALS: u8 = 18;

/// Builder for a single knot.
pub struct KnotBuilder {
    payload: KnotPayload,
    timestamp: Option<u64>,
    expiry: Option<u64>,
    before_states: Vec<ParticipantState>,
}

impl KnotBuilder {
    /// Start building a knot carrying `payload`.
    pub fn new(payload: KnotPayload) -> Self {
        Self {
            payload,
            timestamp: None,
            expiry: None,
            before_states: Vec::new(),
        }
    }

    /// Set the timestamp (defaults to the current time at signing).
    pub fn timestamp(mut self, ts: u64) -> Self {
        self.timestamp = Some(ts);
        self
    }

    /// Set an optional deadline.
    pub fn expiry(mut self, expiry: Option<u64>) -> Self {
        self.expiry = expiry;
        self
    }

    /// Append a participant thread.
    ///
    /// Order is preserved and signed. With no participants the signer's own
    /// thread is used as the only entry.
    pub fn participant(mut self, state: ParticipantState) -> Self {
        self.before_states.push(state);
        self
    }

    /// Assemble, hash, and sign.
    pub fn sign(self, wallet: &Wallet) -> Result<Knot> {
        let timestamp = match self.timestamp {
            Some(ts) => ts,
            None => unix_now()?,
        };
        if let Some(expiry) = self.expiry {
            if expiry <= timestamp {
                return Err(KnotError::params(
                    "expiry",
                    format!("{expiry} is not after timestamp {timestamp}"),
                ));
            }
        }

        let before_states = if self.before_states.is_empty() {
            vec![wallet.participant()]
        } else {
            self.before_states
        };
        let signer = wallet.public_key();
        if !before_states
            .iter()
            .any(|p| p.pubkey == signer && p.thread_id == wallet.address())
        {
            return Err(KnotError::SignerNotParticipant {
                signer: signer.to_hex(),
            });
        }

        participant_count(before_states.len())?;
        let body = encode_body(timestamp, self.expiry, &before_states, &self.payload);
        let id = KnotId::from(Blake3Hash::hash(&body));
        let signature = wallet.sign(&signing_message(&id, &body));

        tracing::debug!(
            id = %id,
            kind = ?self.payload.kind(),
            participants = before_states.len(),
            "signed knot"
        );

        Ok(Knot {
            id,
            timestamp,
            expiry: self.expiry,
            before_states,
            payload: self.payload,
            signature,
            signer,
        })
    }
}

/// Kind-specific parameters that can be turned into a signed knot.
pub trait KnotParams {
    /// Validate and produce the payload for `signer`.
    fn payload(&self, signer: &Wallet) -> Result<KnotPayload>;

    /// Optional deadline, Unix seconds.
    fn expiry(&self) -> Option<u64> {
        None
    }
}

/// Sign a knot for any parameter struct.
pub fn sign_knot<P: KnotParams + ?Sized>(wallet: &Wallet, params: &P) -> Result<Knot> {
    KnotBuilder::new(params.payload(wallet)?)
        .expiry(params.expiry())
        .sign(wallet)
}

fn build_hex<P: KnotParams + ?Sized>(wallet: &Wallet, params: &P) -> Result<String> {
    Ok(sign_knot(wallet, params)?.to_hex())
}

/// Deterministic id of a token defined by `creator`.
pub fn token_id_for(creator: &Address, name: &str, symbol: &str) -> TokenId {
    let mut w = Writer::new();
    w.write_fixed_bytes(creator.as_bytes())
        .write_string(name)
        .write_string(symbol);
    TokenId::from(Blake3Hash::hash(w.as_slice()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

fn validate_name(field: &'static str, name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_NAME_LEN {
        return Err(KnotError::params(
            field,
            format!("length must be 1..={MAX_NAME_LEN}, got {}", name.len()),
        ));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(KnotError::params(field, format!("invalid character {c:?}")));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(KnotError::params(field, "must not start or end with '-'"));
    }
    Ok(())
}

fn validate_symbol(symbol: &str) -> Result<()> {
    if symbol.is_empty() || symbol.len() > MAX_SYMBOL_LEN {
        return Err(KnotError::params(
            "symbol",
            format!("length must be 1..={MAX_SYMBOL_LEN}, got {}", symbol.len()),
        ));
    }
    if let Some(c) = symbol
        .chars()
        .find(|c| !(c.is_ascii_uppercase() || c.is_ascii_digit()))
    {
        return Err(KnotError::params("symbol", format!("invalid character {c:?}")));
    }
    Ok(())
}

fn require_nonzero(field: &'static str, amount: u128) -> Result<()> {
    if amount == 0 {
        return Err(KnotError::params(field, "must be greater than zero"));
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Transfer
// ─────────────────────────────────────────────────────────────────────────────

/// Move `amount` base units of `token_id` to `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferParams {
    pub to: Address,
    pub amount: u128,
    pub token_id: TokenId,
    pub memo: Option<String>,
    pub expiry: Option<u64>,
}

impl TransferParams {
    /// Native-token transfer with no memo.
    pub fn new(to: Address, amount: u128) -> Self {
        Self {
            to,
            amount,
            token_id: TokenId::NATIVE,
            memo: None,
            expiry: None,
        }
    }

    pub fn with_token(mut self, token_id: TokenId) -> Self {
        self.token_id = token_id;
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    pub fn with_expiry(mut self, expiry: u64) -> Self {
        self.expiry = Some(expiry);
        self
    }
}

impl KnotParams for TransferParams {
    fn payload(&self, _signer: &Wallet) -> Result<KnotPayload> {
        require_nonzero("amount", self.amount)?;
        Ok(KnotPayload::Transfer {
            to: self.to,
            token_id: self.token_id,
            amount: self.amount,
            memo: self.memo.clone(),
        })
    }

    fn expiry(&self) -> Option<u64> {
        self.expiry
    }
}

/// Build and sign a transfer; returns the hex wire payload.
pub fn build_transfer(wallet: &Wallet, params: &TransferParams) -> Result<String> {
    build_hex(wallet, params)
}

// ─────────────────────────────────────────────────────────────────────────────
// Names
// ─────────────────────────────────────────────────────────────────────────────

/// Register `name` to the signer's thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameRegistrationParams {
    pub name: String,
    pub expiry: Option<u64>,
}

impl NameRegistrationParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expiry: None,
        }
    }
}

impl KnotParams for NameRegistrationParams {
    fn payload(&self, signer: &Wallet) -> Result<KnotPayload> {
        validate_name("name", &self.name)?;
        Ok(KnotPayload::NameRegistration {
            name: self.name.clone(),
            owner: signer.address(),
        })
    }

    fn expiry(&self) -> Option<u64> {
        self.expiry
    }
}

pub fn build_name_registration(wallet: &Wallet, params: &NameRegistrationParams) -> Result<String> {
    build_hex(wallet, params)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tokens
// ─────────────────────────────────────────────────────────────────────────────

/// Define a new token. `max_supply == 0` means uncapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenDefinitionParams {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
    pub max_supply: u128,
    pub initial_supply: u128,
    pub expiry: Option<u64>,
}

impl KnotParams for TokenDefinitionParams {
    fn payload(&self, _signer: &Wallet) -> Result<KnotPayload> {
        let name_len = self.name.trim().len();
        if name_len == 0 || self.name.len() > MAX_TOKEN_NAME_LEN {
            return Err(KnotError::params(
                "token name",
                format!("length must be 1..={MAX_TOKEN_NAME_LEN}"),
            ));
        }
        validate_symbol(&self.symbol)?;
        if self.decimals > MAX_TOKEN_DECIMALS {
            return Err(KnotError::params(
                "decimals",
                format!("{} exceeds {MAX_TOKEN_DECIMALS}", self.decimals),
            ));
        }
        if self.max_supply != 0 && self.initial_supply > self.max_supply {
            return Err(KnotError::params(
                "initial_supply",
                "exceeds max_supply",
            ));
        }
        Ok(KnotPayload::TokenDefinition {
            name: self.name.clone(),
            symbol: self.symbol.clone(),
            decimals: self.decimals,
            max_supply: self.max_supply,
            initial_supply: self.initial_supply,
        })
    }

    fn expiry(&self) -> Option<u64> {
        self.expiry
    }
}

pub fn build_token_definition(wallet: &Wallet, params: &TokenDefinitionParams) -> Result<String> {
    build_hex(wallet, params)
}

/// Mint `amount` of an existing token to `to`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMintParams {
    pub token_id: TokenId,
    pub to: Address,
    pub amount: u128,
    pub expiry: Option<u64>,
}

impl KnotParams for TokenMintParams {
    fn payload(&self, _signer: &Wallet) -> Result<KnotPayload> {
        require_nonzero("amount", self.amount)?;
        if self.token_id.is_native() {
            return Err(KnotError::params("token_id", "native token cannot be minted"));
        }
        Ok(KnotPayload::TokenMint {
            token_id: self.token_id,
            to: self.to,
            amount: self.amount,
        })
    }

    fn expiry(&self) -> Option<u64> {
        self.expiry
    }
}

pub fn build_token_mint(wallet: &Wallet, params: &TokenMintParams) -> Result<String> {
    build_hex(wallet, params)
}

/// Burn `amount` of a token from the signer's thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenBurnParams {
    pub token_id: TokenId,
    pub amount: u128,
    pub expiry: Option<u64>,
}

impl KnotParams for TokenBurnParams {
    fn payload(&self, _signer: &Wallet) -> Result<KnotPayload> {
        require_nonzero("amount", self.amount)?;
        Ok(KnotPayload::TokenBurn {
            token_id: self.token_id,
            amount: self.amount,
        })
    }

    fn expiry(&self) -> Option<u64> {
        self.expiry
    }
}

pub fn build_token_burn(wallet: &Wallet, params: &TokenBurnParams) -> Result<String> {
    build_hex(wallet, params)
}

// ─────────────────────────────────────────────────────────────────────────────
// Looms
// ─────────────────────────────────────────────────────────────────────────────

/// Deploy a loom. The operator defaults to the signer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoomDeployParams {
    pub name: String,
    pub operator: Option<Ed25519PublicKey>,
    pub config: Option<Vec<u8>>,
    pub expiry: Option<u64>,
}

impl LoomDeployParams {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operator: None,
            config: None,
            expiry: None,
        }
    }
}

impl KnotParams for LoomDeployParams {
    fn payload(&self, signer: &Wallet) -> Result<KnotPayload> {
        validate_name("loom name", &self.name)?;
        Ok(KnotPayload::LoomDeploy {
            name: self.name.clone(),
            operator: self.operator.unwrap_or_else(|| signer.public_key()),
            config: self.config.clone().map(Bytes::from),
        })
    }

    fn expiry(&self) -> Option<u64> {
        self.expiry
    }
}

/// Build and sign a loom deployment.
///
/// The knot id doubles as the new loom's id; decode the payload with
/// [`Knot::from_hex`] and call [`Knot::loom_id`] to recover it.
pub fn build_loom_deploy(wallet: &Wallet, params: &LoomDeployParams) -> Result<String> {
    build_hex(wallet, params)
}

/// Upload bytecode to a deployed loom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoomUploadParams {
    pub loom_id: LoomId,
    pub bytecode: Vec<u8>,
    pub init_msg: Option<Vec<u8>>,
    pub expiry: Option<u64>,
}

impl KnotParams for LoomUploadParams {
    fn payload(&self, _signer: &Wallet) -> Result<KnotPayload> {
        if self.bytecode.is_empty() {
            return Err(KnotError::params("bytecode", "must not be empty"));
        }
        Ok(KnotPayload::LoomBytecodeUpload {
            loom_id: self.loom_id,
            bytecode: Bytes::copy_from_slice(&self.bytecode),
            init_msg: self.init_msg.clone().map(Bytes::from),
        })
    }

    fn expiry(&self) -> Option<u64> {
        self.expiry
    }
}

pub fn build_loom_upload(wallet: &Wallet, params: &LoomUploadParams) -> Result<String> {
    build_hex(wallet, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knot::KnotType;

    fn sender() -> Wallet {
        Wallet::from_private_key(&[0x01; 32]).unwrap()
    }

    fn recipient() -> Address {
        Address::from_bytes([0x02; 20])
    }

    #[test]
    fn test_transfer_decodes_to_expected_fields() {
        let wallet = sender();
        let wire = build_transfer(&wallet, &TransferParams::new(recipient(), 1_000_000_000_000))
            .unwrap();
        assert!(wire.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));

        let knot = Knot::from_hex(&wire).unwrap();
        assert_eq!(knot.knot_type(), KnotType::Transfer);
        assert!(knot.timestamp > 0);
        assert_eq!(knot.expiry, None);
        assert_eq!(knot.before_states.len(), 1);
        assert_eq!(knot.before_states[0].thread_id, wallet.address());
        assert_eq!(knot.before_states[0].pubkey, wallet.public_key());
        assert_eq!(knot.signer, wallet.public_key());
        assert_eq!(
            knot.payload,
            KnotPayload::Transfer {
                to: recipient(),
                token_id: TokenId::NATIVE,
                amount: 1_000_000_000_000,
                memo: None,
            }
        );
        knot.verify().unwrap();
    }

    #[test]
    fn test_fixed_timestamp_is_deterministic() {
        let wallet = sender();
        let payload = TransferParams::new(recipient(), 5).payload(&wallet).unwrap();
        let a = KnotBuilder::new(payload.clone()).timestamp(1_700_000_000).sign(&wallet).unwrap();
        let b = KnotBuilder::new(payload).timestamp(1_700_000_000).sign(&wallet).unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.to_hex(), b.to_hex());
    }

    #[test]
    fn test_any_field_change_breaks_verification() {
        let wallet = sender();
        let params = TransferParams::new(recipient(), 5).with_memo("hi");
        let knot = sign_knot(&wallet, &params).unwrap();

        let mut tampered = knot.clone();
        tampered.timestamp += 1;
        assert!(matches!(tampered.verify(), Err(KnotError::IdMismatch { .. })));

        let mut tampered = knot.clone();
        if let KnotPayload::Transfer { amount, .. } = &mut tampered.payload {
            *amount = 6;
        }
        assert!(matches!(tampered.verify(), Err(KnotError::IdMismatch { .. })));

        let mut tampered = knot.clone();
        tampered.signature.0[0] ^= 1;
        assert!(matches!(tampered.verify(), Err(KnotError::SignatureInvalid)));

        // Re-hashed but not re-signed.
        let mut tampered = knot;
        tampered.expiry = Some(u64::MAX);
        tampered.id = tampered.compute_id();
        assert!(matches!(tampered.verify(), Err(KnotError::SignatureInvalid)));
    }

    #[test]
    fn test_participant_order_is_signed() {
        let wallet = sender();
        let other = Wallet::from_private_key(&[0x09; 32]).unwrap();
        let payload = TransferParams::new(recipient(), 5).payload(&wallet).unwrap();

        let ab = KnotBuilder::new(payload.clone())
            .timestamp(10)
            .participant(wallet.participant())
            .participant(other.participant())
            .sign(&wallet)
            .unwrap();
        let ba = KnotBuilder::new(payload)
            .timestamp(10)
            .participant(other.participant())
            .participant(wallet.participant())
            .sign(&wallet)
            .unwrap();

        assert_ne!(ab.id, ba.id);
        ab.verify().unwrap();
        ba.verify().unwrap();
        assert_eq!(Knot::decode(&ba.to_bytes()).unwrap().before_states[0], other.participant());
    }

    #[test]
    fn test_signer_must_own_a_thread() {
        let wallet = sender();
        let other = Wallet::from_private_key(&[0x09; 32]).unwrap();
        let payload = TransferParams::new(recipient(), 5).payload(&wallet).unwrap();
        let result = KnotBuilder::new(payload)
            .participant(other.participant())
            .sign(&wallet);
        assert!(matches!(result, Err(KnotError::SignerNotParticipant { .. })));
    }

    #[test]
    fn test_expiry_is_encoded() {
        let wallet = sender();
        let params = TransferParams::new(recipient(), 5).with_expiry(u64::MAX);
        let knot = Knot::from_hex(&build_transfer(&wallet, &params).unwrap()).unwrap();
        assert_eq!(knot.expiry, Some(u64::MAX));
        knot.verify().unwrap();
    }

    #[test]
    fn test_expiry_before_timestamp_rejected() {
        let wallet = sender();
        let payload = TransferParams::new(recipient(), 5).payload(&wallet).unwrap();
        let result = KnotBuilder::new(payload)
            .timestamp(100)
            .expiry(Some(100))
            .sign(&wallet);
        assert!(matches!(
            result,
            Err(KnotError::InvalidParams { field: "expiry", .. })
        ));
    }

    #[test]
    fn test_zero_amount_rejected() {
        let wallet = sender();
        assert!(matches!(
            build_transfer(&wallet, &TransferParams::new(recipient(), 0)),
            Err(KnotError::InvalidParams { field: "amount", .. })
        ));
    }

    #[test]
    fn test_name_registration() {
        let wallet = sender();
        let wire =
            build_name_registration(&wallet, &NameRegistrationParams::new("alice-01")).unwrap();
        let knot = Knot::from_hex(&wire).unwrap();
        assert_eq!(
            knot.payload,
            KnotPayload::NameRegistration {
                name: "alice-01".into(),
                owner: wallet.address(),
            }
        );
        knot.verify().unwrap();
    }

    #[test]
    fn test_name_validation() {
        let wallet = sender();
        let long = "a".repeat(33);
        for bad in ["", "Alice", "-alice", "alice-", "al ice", long.as_str()] {
            assert!(
                build_name_registration(&wallet, &NameRegistrationParams::new(bad)).is_err(),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_token_lifecycle() {
        let wallet = sender();
        let def = TokenDefinitionParams {
            name: "Weave Test".into(),
            symbol: "WVT".into(),
            decimals: 12,
            max_supply: 1_000,
            initial_supply: 100,
            expiry: None,
        };
        let knot = Knot::from_hex(&build_token_definition(&wallet, &def).unwrap()).unwrap();
        assert_eq!(knot.knot_type(), KnotType::TokenDefinition);
        knot.verify().unwrap();

        let token_id = token_id_for(&wallet.address(), "Weave Test", "WVT");
        let mint = TokenMintParams {
            token_id,
            to: recipient(),
            amount: 50,
            expiry: None,
        };
        let knot = Knot::from_hex(&build_token_mint(&wallet, &mint).unwrap()).unwrap();
        assert_eq!(knot.knot_type(), KnotType::TokenMint);
        knot.verify().unwrap();

        let burn = TokenBurnParams {
            token_id,
            amount: 10,
            expiry: None,
        };
        let knot = Knot::from_hex(&build_token_burn(&wallet, &burn).unwrap()).unwrap();
        assert_eq!(
            knot.payload,
            KnotPayload::TokenBurn {
                token_id,
                amount: 10
            }
        );
    }

    #[test]
    fn test_token_definition_validation() {
        let wallet = sender();
        let base = TokenDefinitionParams {
            name: "Weave Test".into(),
            symbol: "WVT".into(),
            decimals: 12,
            max_supply: 10,
            initial_supply: 10,
            expiry: None,
        };
        assert!(build_token_definition(&wallet, &base).is_ok());

        let bad_symbol = TokenDefinitionParams {
            symbol: "wvt".into(),
            ..base.clone()
        };
        assert!(build_token_definition(&wallet, &bad_symbol).is_err());

        let bad_decimals = TokenDefinitionParams {
            decimals: 19,
            ..base.clone()
        };
        assert!(build_token_definition(&wallet, &bad_decimals).is_err());

        let over_supply = TokenDefinitionParams {
            initial_supply: 11,
            ..base.clone()
        };
        assert!(build_token_definition(&wallet, &over_supply).is_err());

        let uncapped = TokenDefinitionParams {
            max_supply: 0,
            initial_supply: u128::MAX,
            ..base
        };
        assert!(build_token_definition(&wallet, &uncapped).is_ok());
    }

    #[test]
    fn test_native_token_cannot_be_minted() {
        let wallet = sender();
        let mint = TokenMintParams {
            token_id: TokenId::NATIVE,
            to: recipient(),
            amount: 1,
            expiry: None,
        };
        assert!(build_token_mint(&wallet, &mint).is_err());
    }

    #[test]
    fn test_token_id_depends_on_creator() {
        let a = token_id_for(&Address::from_bytes([1; 20]), "T", "T");
        let b = token_id_for(&Address::from_bytes([2; 20]), "T", "T");
        assert_ne!(a, b);
        // Field framing keeps name/symbol boundaries distinct.
        assert_ne!(
            token_id_for(&Address::from_bytes([1; 20]), "AB", "C"),
            token_id_for(&Address::from_bytes([1; 20]), "A", "BC")
        );
    }

    #[test]
    fn test_loom_deploy_and_upload() {
        let wallet = sender();
        let mut deploy = LoomDeployParams::new("counter");
        deploy.config = Some(b"{\"start\":0}".to_vec());
        let knot = Knot::from_hex(&build_loom_deploy(&wallet, &deploy).unwrap()).unwrap();
        knot.verify().unwrap();
        let loom_id = knot.loom_id().unwrap();
        assert_eq!(loom_id.as_bytes(), knot.id.as_bytes());
        assert!(matches!(
            &knot.payload,
            KnotPayload::LoomDeploy { operator, config: Some(_), .. } if *operator == wallet.public_key()
        ));

        let upload = LoomUploadParams {
            loom_id,
            bytecode: vec![0x00, 0x61, 0x73, 0x6d],
            init_msg: None,
            expiry: None,
        };
        let knot = Knot::from_hex(&build_loom_upload(&wallet, &upload).unwrap()).unwrap();
        knot.verify().unwrap();
        assert_eq!(knot.loom_id(), None);
    }

    #[test]
    fn test_empty_bytecode_rejected() {
        let wallet = sender();
        let upload = LoomUploadParams {
            loom_id: LoomId::from_bytes([1; 32]),
            bytecode: vec![],
            init_msg: None,
            expiry: None,
        };
        assert!(build_loom_upload(&wallet, &upload).is_err());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let wallet = sender();
        let mut bytes = sign_knot(&wallet, &TransferParams::new(recipient(), 1))
            .unwrap()
            .to_bytes();
        bytes.push(0);
        assert!(Knot::decode(&bytes).is_err());
    }
}
