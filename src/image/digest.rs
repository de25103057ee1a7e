//! Content digests for image blobs
//!
//! A [`Digest`] is the `algorithm:hex` identity of a blob. Parsing validates the
//! format; nothing here checks blob contents against a digest.

use crate::config::CANONICAL_ALGORITHM;
use crate::error::{ArchiveError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::fmt;
use std::str::FromStr;

/// Validated `algorithm:hex` content digest
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Digest {
    value: String,
    split: usize,
}

impl Digest {
    /// Parse and validate a digest string such as `sha256:e3b0...`.
    pub fn parse(value: &str) -> Result<Self> {
        let Some(split) = value.find(':') else {
            return Err(ArchiveError::invalid_input(format!(
                "Digest missing algorithm prefix: {:?}",
                value
            )));
        };
        let (algorithm, hex_part) = (&value[..split], &value[split + 1..]);

        let expected_len = match algorithm {
            "sha256" => 64,
            "sha384" => 96,
            "sha512" => 128,
            _ => {
                return Err(ArchiveError::invalid_input(format!(
                    "Unsupported digest algorithm in {:?}",
                    value
                )));
            }
        };
        if hex_part.len() != expected_len {
            return Err(ArchiveError::invalid_input(format!(
                "Invalid {} digest length: expected {} hex characters, got {}",
                algorithm,
                expected_len,
                hex_part.len()
            )));
        }
        if !Self::is_lower_hex(hex_part) {
            return Err(ArchiveError::invalid_input(format!(
                "Invalid digest {:?}: contains non-hex characters",
                value
            )));
        }

        Ok(Digest {
            value: value.to_string(),
            split,
        })
    }

    /// Canonical (SHA-256) digest of `data`.
    pub fn canonical_from_bytes(data: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(data);
        Self::from_sha256(hasher)
    }

    /// Canonical (SHA-256) digest of the UTF-8 bytes of `data`.
    pub fn canonical_from_str(data: &str) -> Self {
        Self::canonical_from_bytes(data.as_bytes())
    }

    /// Finish an incremental SHA-256 computation into a digest.
    pub fn from_sha256(hasher: Sha256) -> Self {
        let value = format!("{}:{}", CANONICAL_ALGORITHM, hex::encode(hasher.finalize()));
        Digest {
            value,
            split: CANONICAL_ALGORITHM.len(),
        }
    }

    pub fn algorithm(&self) -> &str {
        &self.value[..self.split]
    }

    /// The encoded part of the digest, without the algorithm prefix.
    pub fn hex(&self) -> &str {
        &self.value[self.split + 1..]
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    fn is_lower_hex(s: &str) -> bool {
        s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for Digest {
    type Err = ArchiveError;

    fn from_str(s: &str) -> Result<Self> {
        Digest::parse(s)
    }
}

impl TryFrom<String> for Digest {
    type Error = ArchiveError;

    fn try_from(value: String) -> Result<Self> {
        Digest::parse(&value)
    }
}

impl From<Digest> for String {
    fn from(digest: Digest) -> Self {
        digest.value
    }
}

impl AsRef<str> for Digest {
    fn as_ref(&self) -> &str {
        &self.value
    }
}
