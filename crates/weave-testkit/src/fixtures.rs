//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use weave_core::{Address, Ed25519PublicKey, TokenId};
use weave_knot::{
    sign_knot, Knot, KnotBuilder, KnotParams, LoomDeployParams, NameRegistrationParams,
    TransferParams, Wallet,
};
use weave_smt::{balance_key, encode_balance, SparseMerkleTree, StateProofResponse};

/// Timestamp used by every fixture knot, so fixture ids are stable.
pub const FIXED_TIMESTAMP: u64 = 1_700_000_000;

/// A wallet plus helpers for producing signed knots.
pub struct TestFixture {
    pub wallet: Wallet,
}

impl TestFixture {
    /// Create a new fixture with a random wallet.
    pub fn new() -> Self {
        Self {
            wallet: Wallet::generate(),
        }
    }

    /// Create with a deterministic wallet from seed.
    pub fn with_seed(seed: [u8; 32]) -> Self {
        Self {
            wallet: seeded_wallet(seed),
        }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    pub fn public_key(&self) -> Ed25519PublicKey {
        self.wallet.public_key()
    }

    /// A deterministic counterparty wallet.
    pub fn peer(&self, index: u8) -> Wallet {
        let mut seed = [0xee; 32];
        seed[0] = index;
        seeded_wallet(seed)
    }

    /// Sign `params` at [`FIXED_TIMESTAMP`].
    pub fn sign<P: KnotParams>(&self, params: &P) -> Knot {
        let payload = params.payload(&self.wallet).expect("fixture params are valid");
        KnotBuilder::new(payload)
            .timestamp(FIXED_TIMESTAMP)
            .expiry(params.expiry())
            .sign(&self.wallet)
            .expect("fixture knot signs")
    }

    pub fn make_transfer(&self, to: Address, amount: u128) -> Knot {
        self.sign(&TransferParams::new(to, amount))
    }

    pub fn make_name_registration(&self, name: &str) -> Knot {
        self.sign(&NameRegistrationParams::new(name))
    }

    /// Deploy a loom at the current time, as a client would.
    pub fn make_loom_deploy(&self, name: &str) -> Knot {
        sign_knot(&self.wallet, &LoomDeployParams::new(name)).expect("fixture loom signs")
    }
}

fn seeded_wallet(seed: [u8; 32]) -> Wallet {
    Wallet::from_private_key(&seed).expect("seed is 32 bytes")
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Create multiple fixtures for multi-party tests.
pub fn multi_party_fixtures(count: usize) -> Vec<TestFixture> {
    (0..count)
        .map(|i| {
            let mut seed = [0u8; 32];
            seed[0] = i as u8;
            seed[31] = 0x5a;
            TestFixture::with_seed(seed)
        })
        .collect()
}

/// A state tree holding a few `(address, token, balance)` entries.
pub struct StateFixture {
    pub tree: SparseMerkleTree,
    pub balances: Vec<(Address, TokenId, u128)>,
}

impl StateFixture {
    /// `count` holders of the native token with balances `1_000 * (i + 1)`.
    pub fn new(count: u8) -> Self {
        let mut tree = SparseMerkleTree::new();
        let mut balances = Vec::new();
        for i in 0..count {
            let address = Address::from_bytes([i.wrapping_add(1); 20]);
            let balance = 1_000 * (u128::from(i) + 1);
            tree.insert(
                balance_key(&address, &TokenId::NATIVE),
                encode_balance(balance).to_vec(),
            );
            balances.push((address, TokenId::NATIVE, balance));
        }
        Self { tree, balances }
    }

    /// What a node would return for the `index`-th balance.
    pub fn proof_response(&self, index: usize) -> StateProofResponse {
        let (address, token_id, balance) = self.balances[index];
        let proof = self.tree.proof(&balance_key(&address, &token_id));
        StateProofResponse {
            state_root: self.tree.root().to_hex(),
            address: address.to_hex(),
            token_id: token_id.to_hex(),
            balance: weave_smt::BalanceValue::Text(balance.to_string()),
            siblings: proof.siblings.iter().map(|s| s.to_hex()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_knots_verify() {
        let fixture = TestFixture::with_seed([3; 32]);
        let peer = fixture.peer(1);

        let transfer = fixture.make_transfer(peer.address(), 7);
        transfer.verify().unwrap();
        assert_eq!(transfer.timestamp, FIXED_TIMESTAMP);

        fixture.make_name_registration("fixture").verify().unwrap();
        let loom = fixture.make_loom_deploy("fixture-loom");
        assert!(loom.loom_id().is_some());
    }

    #[test]
    fn test_fixture_is_deterministic() {
        let a = TestFixture::with_seed([3; 32]);
        let b = TestFixture::with_seed([3; 32]);
        let to = a.peer(2).address();
        assert_eq!(a.make_transfer(to, 1).id, b.make_transfer(to, 1).id);
    }

    #[test]
    fn test_multi_party() {
        let parties = multi_party_fixtures(3);
        let pks: Vec<_> = parties.iter().map(|p| p.public_key()).collect();
        assert_ne!(pks[0], pks[1]);
        assert_ne!(pks[1], pks[2]);
        assert_ne!(pks[0], pks[2]);
    }

    #[test]
    fn test_state_fixture_proofs() {
        let state = StateFixture::new(4);
        for i in 0..4 {
            assert!(state.proof_response(i).verify().unwrap());
        }
        let mut forged = state.proof_response(0);
        forged.balance = weave_smt::BalanceValue::Number(999_999);
        assert!(!forged.verify().unwrap());
    }
}
