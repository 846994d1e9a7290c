//! Golden test vectors for deterministic verification.
//!
//! Every value here was produced independently of this crate. Any
//! implementation of the knot format, balance keys, or the state tree
//! hashing rule must reproduce them byte for byte.

use serde::Serialize;

use weave_core::{Address, Blake3Hash, TokenId};
use weave_knot::{token_id_for, Knot, KnotBuilder, KnotPayload, Wallet};
use weave_smt::{balance_key, encode_balance, SparseMerkleTree};

/// A knot signed at a fixed time, with its expected encoding.
#[derive(Debug, Clone)]
pub struct KnotVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Private key.
    pub seed: [u8; 32],
    pub timestamp: u64,
    pub expiry: Option<u64>,
    pub payload: KnotPayload,
    /// Expected signer address (hex, with `0x`).
    pub expected_address: &'static str,
    /// Expected knot id (hex).
    pub expected_id: &'static str,
    /// Expected full wire payload (hex).
    pub expected_wire: &'static str,
}

/// All knot vectors.
pub fn knot_vectors() -> Vec<KnotVector> {
    vec![
        KnotVector {
            name: "native transfer of 1.0",
            seed: [0x01; 32],
            timestamp: 1_700_000_000,
            expiry: None,
            payload: KnotPayload::Transfer {
                to: Address::from_bytes([0x02; 20]),
                token_id: TokenId::NATIVE,
                amount: 1_000_000_000_000,
                memo: None,
            },
            expected_address: "0x83561adb398fd87f8e7ed8331bff2fcb945733cc",
            expected_id: "6b5b5cec43e564b96f4a9d5d3418329bf86cf5b18dbea2fce2663b00142c745d",
            expected_wire: concat!(
                "6b5b5cec43e564b96f4a9d5d3418329bf86cf5b18dbea2fce2663b00142c745d",
                "00",
                "00f1536500000000",
                "00",
                "01000000",
                "83561adb398fd87f8e7ed8331bff2fcb945733cc",
                "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c",
                "00000000",
                "0202020202020202020202020202020202020202",
                "0000000000000000000000000000000000000000000000000000000000000000",
                "0010a5d4e80000000000000000000000",
                "00",
                "c5b8ec2a2a854b2ce5f0d6329ab0b07764ba8ff8a1ead785d033de8cb0ef13e6",
                "ed33d938ae446bc187315adda3677a24abfe265d39b3dda6e2dc597ce173c70f",
                "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c",
            ),
        },
        KnotVector {
            name: "token transfer with memo and expiry",
            seed: [0x42; 32],
            timestamp: 1_700_000_000,
            expiry: Some(1_700_003_600),
            payload: KnotPayload::Transfer {
                to: Address::from_bytes([0x03; 20]),
                token_id: TokenId::from_bytes([0x07; 32]),
                amount: 5,
                memo: Some("rent".into()),
            },
            expected_address: "0xfef6dfa48b073924c436539010d7812fbe50096a",
            expected_id: "e523e6058aa61112dfa44e4c10749d35d1553c159478e942f0d029011589f605",
            expected_wire: concat!(
                "e523e6058aa61112dfa44e4c10749d35d1553c159478e942f0d029011589f605",
                "00",
                "00f1536500000000",
                "0110ff536500000000",
                "01000000",
                "fef6dfa48b073924c436539010d7812fbe50096a",
                "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12",
                "00000000",
                "0303030303030303030303030303030303030303",
                "0707070707070707070707070707070707070707070707070707070707070707",
                "05000000000000000000000000000000",
                "010400000072656e74",
                "4b5b709c0717eca8607f3c09e374fa8ec5c6393e1797978481762c6fa1ad6218",
                "a59fb365363ba7d1ee41eb74c6b09cffe49e8a6a127f94c88a44105a2e0d0700",
                "2152f8d19b791d24453242e15f2eab6cb7cffa7b6a5ed30097960e069881db12",
            ),
        },
        KnotVector {
            name: "name registration",
            seed: [0x01; 32],
            timestamp: 1_700_000_000,
            expiry: None,
            payload: KnotPayload::NameRegistration {
                name: "alice".into(),
                owner: Address::from_bytes([
                    0x83, 0x56, 0x1a, 0xdb, 0x39, 0x8f, 0xd8, 0x7f, 0x8e, 0x7e, 0xd8, 0x33, 0x1b,
                    0xff, 0x2f, 0xcb, 0x94, 0x57, 0x33, 0xcc,
                ]),
            },
            expected_address: "0x83561adb398fd87f8e7ed8331bff2fcb945733cc",
            expected_id: "9b9379cfc39412dc31fef2aaa4aafe8e843df7c5128764c1ac6b6a4e5ff9acf5",
            expected_wire: concat!(
                "9b9379cfc39412dc31fef2aaa4aafe8e843df7c5128764c1ac6b6a4e5ff9acf5",
                "01",
                "00f1536500000000",
                "00",
                "01000000",
                "83561adb398fd87f8e7ed8331bff2fcb945733cc",
                "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c",
                "00000000",
                "05000000616c696365",
                "83561adb398fd87f8e7ed8331bff2fcb945733cc",
                "b618b8314da098f845160d599808f3ef31dc8df8552083aa8e5dde46f4e93ee5",
                "d773ff984c67cc51a5f2c4eb78cad068b7a38487a45cacf5e07a3f7c1f66ba00",
                "8a88e3dd7409f195fd52db2d3cba5d72ca6709bf1d94121bf3748801b40f6f5c",
            ),
        },
    ]
}

/// Sign a vector's knot.
pub fn generate_knot_from_vector(vector: &KnotVector) -> Knot {
    let wallet = Wallet::from_private_key(&vector.seed).expect("seed is 32 bytes");
    KnotBuilder::new(vector.payload.clone())
        .timestamp(vector.timestamp)
        .expiry(vector.expiry)
        .sign(&wallet)
        .expect("vector knot signs")
}

/// Single-leaf state tree: the `[0x01; 32]` wallet holding 1.0 native.
pub const BALANCE_KEY: &str = "34a67f279a57a4340aa2c4f416bba4edfe6aa7bb7245a4b5e5a597049a1d8b88";
pub const BALANCE_ROOT: &str = "849a9fb27b26be158bde569cf0a9af979fce455d106d0631a2ae751d6f339772";

/// Token "Weave Test"/"WVT" defined by the `[0x01; 32]` wallet.
pub const TOKEN_ID: &str = "5589fbbc07076e913fe2ebdbae56f5fbd6303baa7bed6ec9a321aedaf3f26128";

/// Outcome of regenerating one vector.
#[derive(Debug, Clone, Serialize)]
pub struct VectorResult {
    pub name: String,
    pub matches: bool,
    pub computed: String,
}

/// Regenerate every vector and compare.
///
/// Returns `(name, matches, computed)` for each.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    vector_results()
        .into_iter()
        .map(|r| (r.name, r.matches, r.computed))
        .collect()
}

fn vector_results() -> Vec<VectorResult> {
    let mut results: Vec<VectorResult> = knot_vectors()
        .iter()
        .map(|v| {
            let knot = generate_knot_from_vector(v);
            let wire = knot.to_hex();
            VectorResult {
                name: v.name.to_string(),
                matches: wire == v.expected_wire && knot.id.to_hex() == v.expected_id,
                computed: wire,
            }
        })
        .collect();

    let wallet = Wallet::from_private_key(&[0x01; 32]).expect("seed is 32 bytes");
    let key = balance_key(&wallet.address(), &TokenId::NATIVE);
    let mut tree = SparseMerkleTree::new();
    tree.insert(key, encode_balance(1_000_000_000_000).to_vec());
    let root = tree.root().to_hex();
    results.push(VectorResult {
        name: "single balance root".into(),
        matches: key.to_hex() == BALANCE_KEY && root == BALANCE_ROOT,
        computed: root,
    });

    let token = token_id_for(&wallet.address(), "Weave Test", "WVT").to_hex();
    results.push(VectorResult {
        name: "token id".into(),
        matches: token == TOKEN_ID,
        computed: token,
    });
    results
}

/// All vector outcomes as pretty JSON, for diffing against other
/// implementations.
pub fn vectors_json() -> String {
    serde_json::to_string_pretty(&vector_results()).unwrap_or_default()
}

/// Root of an empty tree.
pub fn empty_root() -> Blake3Hash {
    SparseMerkleTree::new().root()
}
