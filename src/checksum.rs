//! SHA-256 fingerprints for exported schema documents

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// SHA256 checksum, stored as lowercase hex
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Checksum(String);

impl Checksum {
    /// Compute checksum from a string
    pub fn from_text(content: &str) -> Self {
        let hash = Sha256::digest(content.as_bytes());
        Self(format!("{:x}", hash))
    }

    /// Compute checksum from a JSON value.
    ///
    /// The value is re-serialized compactly, so pretty and compact renderings
    /// of the same document hash identically once parsed back.
    pub fn from_json(value: &serde_json::Value) -> Self {
        Self::from_text(&value.to_string())
    }

    /// Get the hex string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify that JSON value matches this checksum
    pub fn verify_json(&self, value: &serde_json::Value) -> bool {
        *self == Self::from_json(value)
    }
}

impl fmt::Display for Checksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
