//! Content-claim metadata protocol blocks and their wire codec.
//!
//! A provider record's `metadata` field is a binary sequence of
//! `(protocol code, payload length, payload)` blocks. Codes and lengths are
//! unsigned varints; payloads are CBOR. Unrecognised codes are skipped so the
//! format can grow without breaking old readers.

use crate::codec::{cid_bytes, cid_bytes_opt, mh_bytes};
use crate::error::{Error, Result};
use crate::hash::Multihash;
use cid::Cid;
use serde::{Deserialize, Serialize};

/// Multicodec code (private-use range) for equals claims.
pub const EQUALS_CLAIM_ID: u64 = 0x3A_0000;

/// Multicodec code (private-use range) for index claims.
pub const INDEX_CLAIM_ID: u64 = 0x3A_0001;

/// Multicodec code (private-use range) for location commitments.
pub const LOCATION_COMMITMENT_ID: u64 = 0x3A_0002;

/// All protocol codes recognised as content claims.
pub const CONTENT_CLAIM_PROTOCOLS: &[u64] =
    &[EQUALS_CLAIM_ID, INDEX_CLAIM_ID, LOCATION_COMMITMENT_ID];

/// A byte range within a shard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub offset: u64,
    #[serde(default)]
    pub length: Option<u64>,
}

/// Asserts `content ≡ equals` for two multihashes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EqualsClaim {
    #[serde(with = "cid_bytes")]
    pub claim: Cid,
    #[serde(with = "mh_bytes")]
    pub equals: Multihash,
}

/// Asserts that a shard index identified by `index` describes the content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexClaim {
    #[serde(with = "cid_bytes")]
    pub claim: Cid,
    #[serde(with = "mh_bytes")]
    pub index: Multihash,
}

/// Asserts the content is retrievable at the provider, optionally as a
/// sub-range of `shard`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCommitment {
    #[serde(with = "cid_bytes")]
    pub claim: Cid,
    #[serde(default, with = "cid_bytes_opt")]
    pub shard: Option<Cid>,
    #[serde(default)]
    pub range: Option<ByteRange>,
}

/// A decoded protocol block from provider-record metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClaimBlock {
    Equals(EqualsClaim),
    Index(IndexClaim),
    Location(LocationCommitment),
}

impl ClaimBlock {
    /// The block's protocol code.
    pub fn code(&self) -> u64 {
        match self {
            ClaimBlock::Equals(_) => EQUALS_CLAIM_ID,
            ClaimBlock::Index(_) => INDEX_CLAIM_ID,
            ClaimBlock::Location(_) => LOCATION_COMMITMENT_ID,
        }
    }

    /// Every recognised block carries the CID of its backing claim.
    pub fn claim_cid(&self) -> Cid {
        match self {
            ClaimBlock::Equals(c) => c.claim,
            ClaimBlock::Index(c) => c.claim,
            ClaimBlock::Location(c) => c.claim,
        }
    }
}

fn write_uvarint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

fn read_uvarint(data: &[u8]) -> Result<(u64, usize)> {
    let mut value: u64 = 0;
    for (i, byte) in data.iter().enumerate() {
        if i >= 10 {
            break;
        }
        let part = u64::from(byte & 0x7f);
        let shifted = part
            .checked_mul(1u64 << (7 * i))
            .ok_or_else(|| Error::Metadata("varint overflow".to_string()))?;
        value = value
            .checked_add(shifted)
            .ok_or_else(|| Error::Metadata("varint overflow".to_string()))?;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(Error::Metadata("truncated varint".to_string()))
}

/// Decode a metadata byte sequence into its recognised protocol blocks.
///
/// Blocks with unrecognised protocol codes are skipped; a truncated frame or
/// an undecodable payload for a recognised code is an error.
pub fn decode_metadata(data: &[u8]) -> Result<Vec<ClaimBlock>> {
    let mut blocks = Vec::new();
    let mut pos = 0;
    while pos < data.len() {
        let (code, n) = read_uvarint(&data[pos..])?;
        pos += n;
        let (len, n) = read_uvarint(&data[pos..])?;
        pos += n;
        let len = usize::try_from(len)
            .map_err(|_| Error::Metadata("block length out of range".to_string()))?;
        let end = pos
            .checked_add(len)
            .filter(|end| *end <= data.len())
            .ok_or_else(|| Error::Metadata("truncated block payload".to_string()))?;
        let payload = &data[pos..end];
        pos = end;

        match code {
            EQUALS_CLAIM_ID => blocks.push(ClaimBlock::Equals(serde_cbor::from_slice(payload)?)),
            INDEX_CLAIM_ID => blocks.push(ClaimBlock::Index(serde_cbor::from_slice(payload)?)),
            LOCATION_COMMITMENT_ID => {
                blocks.push(ClaimBlock::Location(serde_cbor::from_slice(payload)?))
            }
            _ => {}
        }
    }
    Ok(blocks)
}

/// Encode protocol blocks into the metadata wire format.
pub fn encode_metadata(blocks: &[ClaimBlock]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    for block in blocks {
        let payload = match block {
            ClaimBlock::Equals(c) => serde_cbor::to_vec(c)?,
            ClaimBlock::Index(c) => serde_cbor::to_vec(c)?,
            ClaimBlock::Location(c) => serde_cbor::to_vec(c)?,
        };
        write_uvarint(&mut buf, block.code());
        write_uvarint(&mut buf, payload.len() as u64);
        buf.extend_from_slice(&payload);
    }
    Ok(buf)
}
