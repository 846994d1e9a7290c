//! The Weave client: one wallet plus the settings used to stamp its knots.

use std::time::Duration;

use weave_core::{Address, Ed25519PublicKey, LoomId, TokenId};
use weave_crypt::{
    decrypt, derive_shared_secret, ed25519_to_x25519_secret, encrypt, ChatEvent, ChatEventBuilder,
    EncryptedMessage, EncryptionKey, Tag, X25519PublicKey,
};
use weave_knot::{
    parse_amount, token_id_for, unix_now, wait_for_loom, ConfirmationConfig, Knot, KnotBuilder,
    KnotParams, LoomDeployParams, LoomQuery, LoomUploadParams, NameRegistrationParams,
    TokenBurnParams, TokenDefinitionParams, TokenMintParams, TransferParams, Wallet,
};
use weave_smt::StateProofResponse;

use crate::error::Result;

/// Configuration for a [`Weave`] client.
#[derive(Debug, Clone, Default)]
pub struct WeaveConfig {
    /// Polling for loom confirmation.
    pub confirmation: ConfirmationConfig,
    /// Deadline applied to knots whose parameters carry no expiry.
    pub default_expiry: Option<Duration>,
}

/// A wallet bound to a configuration.
///
/// Every builder method returns the hex wire payload to submit to a node.
/// Nothing here performs network I/O except [`Weave::wait_for_loom`], which
/// goes through the caller's [`LoomQuery`].
#[derive(Debug)]
pub struct Weave {
    wallet: Wallet,
    config: WeaveConfig,
}

impl Weave {
    pub fn new(wallet: Wallet, config: WeaveConfig) -> Self {
        Self { wallet, config }
    }

    /// Client for a hex private key (optional `0x` prefix).
    pub fn from_hex(private_key: &str, config: WeaveConfig) -> Result<Self> {
        Ok(Self::new(Wallet::from_hex(private_key)?, config))
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn config(&self) -> &WeaveConfig {
        &self.config
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.wallet.public_key()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Knots
    // ─────────────────────────────────────────────────────────────────────────

    /// Sign any knot, applying the configured default expiry when the
    /// parameters carry none.
    pub fn sign<P: KnotParams + ?Sized>(&self, params: &P) -> Result<Knot> {
        let timestamp = unix_now()?;
        let expiry = params.expiry().or_else(|| {
            self.config
                .default_expiry
                .map(|d| timestamp.saturating_add(d.as_secs().max(1)))
        });
        Ok(KnotBuilder::new(params.payload(&self.wallet)?)
            .timestamp(timestamp)
            .expiry(expiry)
            .sign(&self.wallet)?)
    }

    fn sign_hex<P: KnotParams + ?Sized>(&self, params: &P) -> Result<String> {
        Ok(self.sign(params)?.to_hex())
    }

    pub fn transfer(&self, params: &TransferParams) -> Result<String> {
        self.sign_hex(params)
    }

    /// Native transfer from textual inputs: a hex address and a decimal amount.
    pub fn send(&self, to: &str, amount: &str) -> Result<String> {
        let to = Address::from_hex(to)?;
        let amount = parse_amount(amount).map_err(weave_knot::KnotError::from)?;
        self.transfer(&TransferParams::new(to, amount))
    }

    pub fn register_name(&self, name: &str) -> Result<String> {
        self.sign_hex(&NameRegistrationParams::new(name))
    }

    /// Define a token; returns the wire payload and the new token's id.
    pub fn define_token(&self, params: &TokenDefinitionParams) -> Result<(String, TokenId)> {
        let wire = self.sign_hex(params)?;
        Ok((wire, token_id_for(&self.address(), &params.name, &params.symbol)))
    }

    pub fn mint(&self, params: &TokenMintParams) -> Result<String> {
        self.sign_hex(params)
    }

    pub fn burn(&self, params: &TokenBurnParams) -> Result<String> {
        self.sign_hex(params)
    }

    /// Deploy a loom; returns the wire payload and the new loom's id.
    pub fn deploy_loom(&self, params: &LoomDeployParams) -> Result<(String, LoomId)> {
        let knot = self.sign(params)?;
        Ok((knot.to_hex(), LoomId::from(knot.id)))
    }

    pub fn upload_loom(&self, params: &LoomUploadParams) -> Result<String> {
        self.sign_hex(params)
    }

    /// Wait, bounded by the configured timeout, until `loom_id` is deployed.
    #[tracing::instrument(skip_all, fields(loom = %loom_id))]
    pub async fn wait_for_loom<Q: LoomQuery + ?Sized>(
        &self,
        query: &Q,
        loom_id: &LoomId,
    ) -> Result<u32> {
        Ok(wait_for_loom(query, loom_id, &self.config.confirmation).await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Proofs
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify a state-proof RPC response for this wallet's own balance.
    ///
    /// A response for another address is rejected rather than verified.
    pub fn verify_own_balance(&self, response: &StateProofResponse) -> Result<bool> {
        if Address::from_hex(&response.address)? != self.address() {
            tracing::debug!(
                expected = %self.address(),
                got = %response.address,
                "state proof is for another address"
            );
            return Ok(false);
        }
        Ok(response.verify()?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Encryption
    // ─────────────────────────────────────────────────────────────────────────

    /// This wallet's X25519 public key, to publish for incoming messages.
    pub fn x25519_public(&self) -> Result<X25519PublicKey> {
        Ok(ed25519_to_x25519_secret(&self.wallet.private_key())?.public_key())
    }

    /// Seal a message to another wallet's X25519 key.
    pub fn encrypt_to(
        &self,
        recipient: &X25519PublicKey,
        plaintext: &[u8],
    ) -> Result<EncryptedMessage> {
        Ok(encrypt(recipient, plaintext)?)
    }

    /// Open a message sealed to this wallet.
    pub fn decrypt(&self, message: &EncryptedMessage) -> Result<Vec<u8>> {
        let secret = ed25519_to_x25519_secret(&self.wallet.private_key())?;
        Ok(decrypt(&secret, message)?)
    }

    /// Static key shared with `peer`; both sides derive the same key.
    pub fn shared_key(&self, peer: &X25519PublicKey) -> Result<EncryptionKey> {
        Ok(derive_shared_secret(&self.wallet.private_key(), peer)?)
    }

    /// Sign a chat event with this wallet's key.
    pub fn chat_event(&self, kind: u32, content: &str, tags: &[Tag]) -> Result<ChatEvent> {
        let keypair = weave_core::Keypair::from_seed(&self.wallet.private_key());
        Ok(ChatEventBuilder::new(kind, content)
            .tags(tags.iter().cloned())
            .sign(&keypair)?)
    }
}
