//! Byte-string serde representations for content-addressing types.
//!
//! CBOR carries multihashes, CIDs, and multiaddrs as plain byte strings; these
//! helper modules are used with `#[serde(with = "…")]` on wire-format structs.

use cid::Cid;
use multiaddr::Multiaddr;
use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserializer, Serialize, Serializer};
use std::fmt;

use crate::hash::Multihash;

pub(crate) mod mh_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(mh: &Multihash, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_bytes(&mh.to_bytes())
    }

    struct MhVisitor;

    impl<'de> Visitor<'de> for MhVisitor {
        type Value = Multihash;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "multihash bytes")
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            Multihash::from_bytes(v).map_err(de::Error::custom)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Multihash, D::Error> {
        de.deserialize_bytes(MhVisitor)
    }
}

pub(crate) mod cid_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(cid: &Cid, ser: S) -> Result<S::Ok, S::Error> {
        ser.serialize_bytes(&cid.to_bytes())
    }

    pub(super) struct CidVisitor;

    impl<'de> Visitor<'de> for CidVisitor {
        type Value = Cid;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "CID bytes")
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            Cid::try_from(v).map_err(de::Error::custom)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Cid, D::Error> {
        de.deserialize_bytes(CidVisitor)
    }
}

pub(crate) mod cid_bytes_opt {
    use super::*;

    struct CidBytes<'a>(&'a Cid);

    impl Serialize for CidBytes<'_> {
        fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
            ser.serialize_bytes(&self.0.to_bytes())
        }
    }

    pub fn serialize<S: Serializer>(cid: &Option<Cid>, ser: S) -> Result<S::Ok, S::Error> {
        match cid {
            Some(c) => ser.serialize_some(&CidBytes(c)),
            None => ser.serialize_none(),
        }
    }

    struct OptVisitor;

    impl<'de> Visitor<'de> for OptVisitor {
        type Value = Option<Cid>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "optional CID bytes")
        }

        fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(None)
        }

        fn visit_some<D: Deserializer<'de>>(self, de: D) -> Result<Self::Value, D::Error> {
            de.deserialize_bytes(super::cid_bytes::CidVisitor).map(Some)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Option<Cid>, D::Error> {
        de.deserialize_option(OptVisitor)
    }
}

pub(crate) mod multiaddr_vec {
    use super::*;

    struct AddrBytes<'a>(&'a Multiaddr);

    impl Serialize for AddrBytes<'_> {
        fn serialize<S: Serializer>(&self, ser: S) -> Result<S::Ok, S::Error> {
            ser.serialize_bytes(&self.0.to_vec())
        }
    }

    pub fn serialize<S: Serializer>(addrs: &[Multiaddr], ser: S) -> Result<S::Ok, S::Error> {
        let mut seq = ser.serialize_seq(Some(addrs.len()))?;
        for addr in addrs {
            seq.serialize_element(&AddrBytes(addr))?;
        }
        seq.end()
    }

    struct AddrElem(Multiaddr);

    struct AddrElemVisitor;

    impl<'de> Visitor<'de> for AddrElemVisitor {
        type Value = AddrElem;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "multiaddr bytes")
        }

        fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
            Multiaddr::try_from(v.to_vec())
                .map(AddrElem)
                .map_err(de::Error::custom)
        }
    }

    impl<'de> serde::Deserialize<'de> for AddrElem {
        fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
            de.deserialize_bytes(AddrElemVisitor)
        }
    }

    struct VecVisitor;

    impl<'de> Visitor<'de> for VecVisitor {
        type Value = Vec<Multiaddr>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "sequence of multiaddr bytes")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut addrs = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(AddrElem(addr)) = seq.next_element()? {
                addrs.push(addr);
            }
            Ok(addrs)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Multiaddr>, D::Error> {
        de.deserialize_seq(VecVisitor)
    }
}
