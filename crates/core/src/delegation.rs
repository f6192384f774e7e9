//! Delegations: verifiable capability documents backing content claims.
//!
//! A delegation is fetched by claim CID from the provider that published it.
//! This crate parses and round-trips the document; cryptographic verification
//! belongs to the surrounding service layer.

use crate::did::Did;
use crate::error::Result;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// A single capability asserted by a delegation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Capability {
    /// Ability name, e.g. `assert/location`.
    pub can: String,
    /// Resource the ability applies to.
    pub with: String,
    /// Ability-specific caveats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nb: Option<serde_cbor::Value>,
}

/// A content claim: a signed capability document delegated from an issuer to
/// an audience.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Delegation {
    pub issuer: Did,
    pub audience: Did,
    pub capabilities: Vec<Capability>,
    /// Unix timestamp after which the claim is no longer valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<u64>,
    pub signature: Bytes,
}

impl Delegation {
    /// Parse a delegation from its CBOR archive.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(serde_cbor::from_slice(data)?)
    }

    /// Serialise the delegation to its CBOR archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_cbor::to_vec(self)?)
    }
}
