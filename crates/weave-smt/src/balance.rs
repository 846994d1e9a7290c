//! Balance proofs as served by the node's state-proof RPC.
//!
//! A balance lives in the state tree under `H(address || token_id)` with the
//! balance encoded as a 16-byte little-endian integer.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use weave_core::{Address, Blake3Hash, TokenId};

use crate::error::{Result, SmtError};
use crate::proof::verify;

/// State-tree key of a `(thread, token)` balance.
pub fn balance_key(address: &Address, token_id: &TokenId) -> Blake3Hash {
    Blake3Hash::hash_parts(&[&address.as_bytes()[..], &token_id.as_bytes()[..]])
}

/// Leaf value of a balance.
pub fn encode_balance(balance: u128) -> [u8; 16] {
    balance.to_le_bytes()
}

/// Verify a balance against a state root.
pub fn verify_balance(
    root: &Blake3Hash,
    address: &Address,
    token_id: &TokenId,
    balance: u128,
    siblings: &[Blake3Hash],
) -> bool {
    let key = balance_key(address, token_id);
    verify(root, &key, &encode_balance(balance), siblings)
}

/// Verify a balance given the hex fields of an RPC response.
///
/// Undecodable fields are errors; a proof that simply does not check out
/// (including a wrong sibling count) is `Ok(false)`.
pub fn verify_balance_hex(
    root: &str,
    address: &str,
    token_id: &str,
    balance: u128,
    siblings: &[String],
) -> Result<bool> {
    let root = Blake3Hash::from_hex(root)?;
    let address = Address::from_hex(address)?;
    let token_id = TokenId::from_hex(token_id)?;
    let siblings = siblings
        .iter()
        .map(|s| Blake3Hash::from_hex(s))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(verify_balance(&root, &address, &token_id, balance, &siblings))
}

/// Balance as it appears on the wire: JSON number or decimal string.
///
/// Numbers are read from their exact JSON text, so integers past `u64::MAX`
/// survive up to `u128::MAX`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum BalanceValue {
    Number(u128),
    Text(String),
}

impl<'de> Deserialize<'de> for BalanceValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::Number(n) => {
                let text = n.to_string();
                text.parse::<u128>().map(BalanceValue::Number).map_err(|_| {
                    D::Error::custom(format!(
                        "invalid balance {text}: expected an integer in 0..=2^128-1"
                    ))
                })
            }
            serde_json::Value::String(s) => Ok(BalanceValue::Text(s)),
            other => Err(D::Error::custom(format!(
                "invalid balance {other}: expected a number or a decimal string"
            ))),
        }
    }
}

impl BalanceValue {
    pub fn to_u128(&self) -> Result<u128> {
        match self {
            BalanceValue::Number(n) => Ok(*n),
            BalanceValue::Text(s) => s
                .trim()
                .parse::<u128>()
                .map_err(|e| SmtError::InvalidBalance(format!("{s:?}: {e}"))),
        }
    }
}

/// JSON shape returned by the node's state-proof endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateProofResponse {
    pub state_root: String,
    pub address: String,
    pub token_id: String,
    pub balance: BalanceValue,
    pub siblings: Vec<String>,
}

impl StateProofResponse {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode every field and verify the balance proof.
    pub fn verify(&self) -> Result<bool> {
        verify_balance_hex(
            &self.state_root,
            &self.address,
            &self.token_id,
            self.balance.to_u128()?,
            &self.siblings,
        )
    }
}
