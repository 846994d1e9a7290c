//! Proptest generators for property-based testing.

use proptest::prelude::*;

use weave_core::{Address, Blake3Hash, Keypair, LoomId, TokenId};
use weave_knot::{Knot, KnotBuilder, KnotPayload, Wallet};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

pub fn address() -> impl Strategy<Value = Address> {
    any::<[u8; 20]>().prop_map(Address::from_bytes)
}

/// Native token half the time, a random token otherwise.
pub fn token_id() -> impl Strategy<Value = TokenId> {
    prop_oneof![
        Just(TokenId::NATIVE),
        any::<[u8; 32]>().prop_map(TokenId::from_bytes),
    ]
}

pub fn loom_id() -> impl Strategy<Value = LoomId> {
    any::<[u8; 32]>().prop_map(LoomId::from_bytes)
}

pub fn blake3_hash() -> impl Strategy<Value = Blake3Hash> {
    any::<[u8; 32]>().prop_map(Blake3Hash)
}

/// Non-zero base-unit amount, biased towards the edges.
pub fn amount() -> impl Strategy<Value = u128> {
    prop_oneof![
        Just(1u128),
        Just(u128::MAX),
        1u128..=1_000_000_000_000_000u128,
        1u128..=u128::MAX,
    ]
}

/// A valid registrable name.
pub fn name() -> impl Strategy<Value = String> {
    "[a-z0-9]([a-z0-9-]{0,30}[a-z0-9])?".prop_map(String::from)
}

pub fn timestamp() -> impl Strategy<Value = u64> {
    1u64..=4_102_444_800u64
}

/// Any kind-specific payload, including ones no builder would emit.
pub fn knot_payload() -> impl Strategy<Value = KnotPayload> {
    let blob = || prop::collection::vec(any::<u8>(), 0..256);
    prop_oneof![
        (address(), token_id(), any::<u128>(), proptest::option::of(".{0,40}")).prop_map(
            |(to, token_id, amount, memo)| KnotPayload::Transfer {
                to,
                token_id,
                amount,
                memo,
            }
        ),
        (name(), address()).prop_map(|(name, owner)| KnotPayload::NameRegistration { name, owner }),
        (".{0,20}", "[A-Z0-9]{1,12}", 0u8..=18, any::<u128>(), any::<u128>()).prop_map(
            |(name, symbol, decimals, max_supply, initial_supply)| KnotPayload::TokenDefinition {
                name,
                symbol,
                decimals,
                max_supply,
                initial_supply,
            }
        ),
        (token_id(), address(), any::<u128>()).prop_map(|(token_id, to, amount)| {
            KnotPayload::TokenMint {
                token_id,
                to,
                amount,
            }
        }),
        (token_id(), any::<u128>())
            .prop_map(|(token_id, amount)| KnotPayload::TokenBurn { token_id, amount }),
        (name(), keypair(), proptest::option::of(blob())).prop_map(|(name, kp, config)| {
            KnotPayload::LoomDeploy {
                name,
                operator: kp.public_key(),
                config: config.map(Into::into),
            }
        }),
        (loom_id(), blob(), proptest::option::of(blob())).prop_map(
            |(loom_id, bytecode, init_msg)| KnotPayload::LoomBytecodeUpload {
                loom_id,
                bytecode: bytecode.into(),
                init_msg: init_msg.map(Into::into),
            }
        ),
    ]
}

/// Parameters for a signed knot.
#[derive(Debug, Clone)]
pub struct KnotParamsInput {
    pub seed: [u8; 32],
    pub timestamp: u64,
    pub expiry_delta: Option<u64>,
    pub payload: KnotPayload,
}

pub fn knot_params() -> impl Strategy<Value = KnotParamsInput> {
    (
        any::<[u8; 32]>(),
        timestamp(),
        proptest::option::of(1u64..=86_400),
        knot_payload(),
    )
        .prop_map(|(seed, timestamp, expiry_delta, payload)| KnotParamsInput {
            seed,
            timestamp,
            expiry_delta,
            payload,
        })
}

/// Sign a knot from generated parameters.
pub fn sign_from_params(params: &KnotParamsInput) -> Knot {
    let wallet = Wallet::from_private_key(&params.seed).expect("seed is 32 bytes");
    KnotBuilder::new(params.payload.clone())
        .timestamp(params.timestamp)
        .expiry(params.expiry_delta.map(|d| params.timestamp + d))
        .sign(&wallet)
        .expect("generated timestamps precede expiry")
}
