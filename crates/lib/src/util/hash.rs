//! Content hashing for rendered build graphs.
//!
//! A graph's hash is the SHA-256 of its JSON serialization. It is stamped
//! into the definition file so an unchanged graph is never rewritten.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub type HashError = serde_json::Error;

/// A full 64-character lowercase hexadecimal SHA-256.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphHash(pub String);

impl std::fmt::Display for GraphHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

pub trait Hashable: Serialize {
  fn compute_hash(&self) -> Result<GraphHash, HashError> {
    let serialized = serde_json::to_string(self)?;
    Ok(hash_bytes(serialized.as_bytes()))
  }
}

pub fn hash_bytes(data: &[u8]) -> GraphHash {
  let mut hasher = Sha256::new();
  hasher.update(data);
  GraphHash(hex::encode(hasher.finalize()))
}
