//! Signed chat events.
//!
//! An event's id is the Blake3 hash of the canonical CBOR array
//! `[pubkey, kind, created_at, tags, content]`, and `sig` is an Ed25519
//! signature over the 32 id bytes. JSON form:
//!
//! ```json
//! {"id": "<64 hex>", "pubkey": "<64 hex>", "kind": 1, "created_at": 1700000000,
//!  "tags": [["p", "..."]], "content": "hi", "sig": "<128 hex>"}
//! ```

use ciborium::value::Value;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use weave_core::{Blake3Hash, Ed25519PublicKey, Ed25519Signature, Keypair};

use crate::canonical::to_canonical_bytes;
use crate::error::{CryptError, Result};

/// A `[key, value]` tag.
pub type Tag = (String, String);

/// A signed chat event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEvent {
    pub id: Blake3Hash,
    pub pubkey: Ed25519PublicKey,
    pub kind: u32,
    pub created_at: u64,
    pub tags: Vec<Tag>,
    pub content: String,
    pub sig: Ed25519Signature,
}

/// Canonical bytes hashed into an event id.
pub fn canonical_event_bytes(
    pubkey: &Ed25519PublicKey,
    kind: u32,
    created_at: u64,
    tags: &[Tag],
    content: &str,
) -> Result<Vec<u8>> {
    let tags = tags
        .iter()
        .map(|(k, v)| Value::Array(vec![Value::Text(k.clone()), Value::Text(v.clone())]))
        .collect();
    to_canonical_bytes(&Value::Array(vec![
        Value::Bytes(pubkey.as_bytes().to_vec()),
        Value::Integer(kind.into()),
        Value::Integer(created_at.into()),
        Value::Array(tags),
        Value::Text(content.to_owned()),
    ]))
}

impl ChatEvent {
    /// Recompute the id from the event's fields.
    pub fn compute_id(&self) -> Result<Blake3Hash> {
        let bytes = canonical_event_bytes(
            &self.pubkey,
            self.kind,
            self.created_at,
            &self.tags,
            &self.content,
        )?;
        Ok(Blake3Hash::hash(&bytes))
    }

    /// Check the id and the signature over it.
    pub fn verify(&self) -> Result<()> {
        let computed = self.compute_id()?;
        if computed != self.id {
            tracing::debug!(
                stored = %self.id.to_hex(),
                computed = %computed.to_hex(),
                "chat event id mismatch"
            );
            return Err(CryptError::IdMismatch {
                stored: self.id.to_hex(),
                computed: computed.to_hex(),
            });
        }
        self.pubkey
            .verify(self.id.as_bytes(), &self.sig)
            .map_err(|_| CryptError::SignatureInvalid)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// First value of the tag named `key`.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for a chat event.
#[derive(Debug, Clone)]
pub struct ChatEventBuilder {
    kind: u32,
    content: String,
    tags: Vec<Tag>,
    created_at: Option<u64>,
}

impl ChatEventBuilder {
    pub fn new(kind: u32, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            tags: Vec::new(),
            created_at: None,
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Override the creation time (defaults to now).
    pub fn created_at(mut self, ts: u64) -> Self {
        self.created_at = Some(ts);
        self
    }

    pub fn sign(self, keypair: &Keypair) -> Result<ChatEvent> {
        let created_at = match self.created_at {
            Some(ts) => ts,
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| CryptError::Clock(e.to_string()))?
                .as_secs(),
        };
        let pubkey = keypair.public_key();
        let id = Blake3Hash::hash(&canonical_event_bytes(
            &pubkey,
            self.kind,
            created_at,
            &self.tags,
            &self.content,
        )?);
        let sig = keypair.sign(id.as_bytes());

        Ok(ChatEvent {
            id,
            pubkey,
            kind: self.kind,
            created_at,
            tags: self.tags,
            content: self.content,
            sig,
        })
    }
}

/// Create and sign an event stamped with the current time.
pub fn create_chat_event(
    private_key: &[u8],
    kind: u32,
    content: &str,
    tags: &[Tag],
) -> Result<ChatEvent> {
    let keypair = Keypair::from_slice(private_key)?;
    ChatEventBuilder::new(kind, content)
        .tags(tags.iter().cloned())
        .sign(&keypair)
}

/// Whether the event's id and signature both check out.
pub fn verify_chat_event(event: &ChatEvent) -> bool {
    event.verify().is_ok()
}
