//! Multihash helpers and context identifiers.

use crate::did::Did;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Self-describing cryptographic digest identifying content.
pub type Multihash = multihash::Multihash<64>;

/// Multicodec code for sha2-256.
pub const SHA2_256_CODE: u64 = 0x12;

/// Multicodec code for raw (unwrapped) blocks.
pub const RAW_CODEC: u64 = 0x55;

/// Compute the sha2-256 multihash of `data`.
pub fn sha256_multihash(data: &[u8]) -> Multihash {
    let digest = Sha256::digest(data);
    Multihash::wrap(SHA2_256_CODE, &digest).expect("32-byte digest always fits")
}

/// Opaque identifier scoping a claim or index to a (space, content) pair.
///
/// The canonical derivation is `sha2-256(space-DID ‖ multihash-bytes)` wrapped
/// as a multihash. Routing-index publishers of equals claims instead place the
/// content multihash's bytes here directly; both forms parse via
/// [`EncodedContextId::to_multihash`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EncodedContextId(Vec<u8>);

impl EncodedContextId {
    /// Wrap raw context-identifier bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Context identifier carrying a content multihash (equals-claim convention).
    pub fn from_multihash(hash: &Multihash) -> Self {
        Self(hash.to_bytes())
    }

    /// Derive the context identifier for a space-scoped claim on `hash`.
    pub fn for_space(space: &Did, hash: &Multihash) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(space.as_str().as_bytes());
        hasher.update(hash.to_bytes());
        let digest = hasher.finalize();
        let wrapped = multihash::Multihash::<64>::wrap(SHA2_256_CODE, &digest)
            .expect("32-byte digest always fits");
        Self(wrapped.to_bytes())
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Reinterpret the identifier as a multihash.
    pub fn to_multihash(&self) -> crate::Result<Multihash> {
        Multihash::from_bytes(&self.0).map_err(|e| crate::Error::InvalidHash(e.to_string()))
    }

    /// Encode as lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Debug for EncodedContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex = self.to_hex();
        write!(f, "EncodedContextId({})", &hex[..hex.len().min(16)])
    }
}

impl fmt::Display for EncodedContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for EncodedContextId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

struct ContextIdVisitor;

impl<'de> Visitor<'de> for ContextIdVisitor {
    type Value = EncodedContextId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "context identifier bytes")
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<Self::Value, E> {
        Ok(EncodedContextId(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<Self::Value, E> {
        Ok(EncodedContextId(v))
    }
}

impl<'de> Deserialize<'de> for EncodedContextId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_bytes(ContextIdVisitor)
    }
}
