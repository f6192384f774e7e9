//! Provider records and their CBOR codec.
//!
//! Provider results are serialised as a CBOR list. Peer IDs and multiaddrs are
//! carried as plain byte strings; `context_id` and `metadata` likewise. Two
//! records are equal when their context and metadata bytes match and their
//! provider info reads the same.

use crate::error::Result;
use crate::hash::EncodedContextId;
use bytes::Bytes;
use multiaddr::Multiaddr;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// An addressable peer identity (multihash of the peer's public key).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PeerId(Vec<u8>);

impl PeerId {
    /// Wrap raw peer-identity bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", cid::multibase::encode(cid::multibase::Base::Base58Btc, &self.0))
    }
}

impl fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PeerId({self})")
    }
}

impl Serialize for PeerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

struct PeerIdVisitor;

impl<'de> Visitor<'de> for PeerIdVisitor {
    type Value = PeerId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "peer identity bytes")
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> std::result::Result<Self::Value, E> {
        Ok(PeerId(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> std::result::Result<Self::Value, E> {
        Ok(PeerId(v))
    }
}

impl<'de> Deserialize<'de> for PeerId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_bytes(PeerIdVisitor)
    }
}

/// A peer identity together with its announced network addresses.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub peer: PeerId,
    #[serde(with = "crate::codec::multiaddr_vec")]
    pub addrs: Vec<Multiaddr>,
}

/// A single provider result: who holds the content, under which claim context,
/// and the claim protocol blocks describing it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderRecord {
    pub provider: ProviderInfo,
    pub context_id: EncodedContextId,
    pub metadata: Bytes,
}

impl PartialEq for ProviderRecord {
    fn eq(&self, other: &Self) -> bool {
        self.context_id == other.context_id
            && self.metadata == other.metadata
            && self.provider == other.provider
    }
}

impl Eq for ProviderRecord {}

/// Encode a list of provider records as CBOR.
pub fn encode_records(records: &[ProviderRecord]) -> Result<Vec<u8>> {
    Ok(serde_cbor::to_vec(&records)?)
}

/// Decode a list of provider records from CBOR bytes.
pub fn decode_records(data: &[u8]) -> Result<Vec<ProviderRecord>> {
    Ok(serde_cbor::from_slice(data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256_multihash;

    fn provider() -> ProviderInfo {
        ProviderInfo {
            peer: PeerId::from_bytes(sha256_multihash(b"peer").to_bytes()),
            addrs: vec![
                "/ip4/203.0.113.7/tcp/8080/http".parse().unwrap(),
                "/dns4/claims.example.com/tcp/443/https".parse().unwrap(),
            ],
        }
    }

    fn record(seed: &[u8]) -> ProviderRecord {
        ProviderRecord {
            provider: provider(),
            context_id: EncodedContextId::from_multihash(&sha256_multihash(seed)),
            metadata: Bytes::from(seed.to_vec()),
        }
    }

    #[test]
    fn records_roundtrip_through_cbor() {
        let records = vec![record(b"one"), record(b"two")];
        let encoded = encode_records(&records).unwrap();
        let decoded = decode_records(&encoded).unwrap();
        assert_eq!(decoded, records);
    }

    #[test]
    fn empty_list_roundtrips() {
        let encoded = encode_records(&[]).unwrap();
        assert_eq!(decode_records(&encoded).unwrap(), Vec::<ProviderRecord>::new());
    }

    #[test]
    fn equality_tracks_context_metadata_and_provider() {
        let a = record(b"one");
        let mut b = a.clone();
        assert_eq!(a, b);

        b.metadata = Bytes::from_static(b"different");
        assert_ne!(a, b);

        let mut c = a.clone();
        c.provider.addrs.pop();
        assert_ne!(a, c);
    }

    #[test]
    fn peer_id_displays_base58btc() {
        let peer = PeerId::from_bytes(vec![0x12, 0x20, 0xaa]);
        assert!(peer.to_string().starts_with('z'));
    }
}
