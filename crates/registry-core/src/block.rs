use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::PayloadError;

/// One ledger entry. Every field except `body` is stamped by the chain at
/// commit time; a committed block is never modified.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub height: u64,
    pub time: u64,
    pub previous_block_hash: Option<String>,
    pub hash: String,
    pub body: String,
}

impl Block {
    /// An unstamped block carrying the hex-encoded JSON of `payload`.
    pub fn new<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            height: 0,
            time: 0,
            previous_block_hash: None,
            hash: String::new(),
            body: hex::encode(serde_json::to_vec(payload)?),
        })
    }

    /// Canonical bytes of the block with the hash field held empty.
    pub fn hash_bytes(&self) -> Vec<u8> {
        let prev = self.previous_block_hash.as_deref().unwrap_or_default();
        let mut bytes = Vec::with_capacity(8 + 8 + 1 + 8 + prev.len() + 8 + self.body.len() + 8);
        bytes.extend_from_slice(&self.height.to_le_bytes());
        bytes.extend_from_slice(&self.time.to_le_bytes());
        match &self.previous_block_hash {
            Some(prev) => {
                bytes.push(1);
                push_field(&mut bytes, prev.as_bytes());
            }
            None => bytes.push(0),
        }
        push_field(&mut bytes, self.body.as_bytes());
        push_field(&mut bytes, &[]);
        bytes
    }

    /// Hex SHA-256 over `hash_bytes`.
    pub fn compute_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.hash_bytes());
        hex::encode(hasher.finalize())
    }

    /// True when the stored hash matches a fresh recomputation.
    pub fn validate(&self) -> bool {
        self.compute_hash() == self.hash
    }

    /// Decode the body back into its payload type.
    pub fn decode_body<T: DeserializeOwned>(&self) -> Result<T, PayloadError> {
        let raw = hex::decode(&self.body)?;
        Ok(serde_json::from_slice(&raw)?)
    }
}

fn push_field(bytes: &mut Vec<u8>, field: &[u8]) {
    bytes.extend_from_slice(&(field.len() as u64).to_le_bytes());
    bytes.extend_from_slice(field);
}
