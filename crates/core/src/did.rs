//! Decentralised identifiers for spaces and principals.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated decentralised identifier (e.g. `did:key:z6Mk…`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Create a DID, validating the `did:` prefix.
    pub fn new(s: impl Into<String>) -> crate::Result<Self> {
        let s = s.into();
        if !s.starts_with("did:") || s.len() <= 4 {
            return Err(crate::Error::InvalidDid(s));
        }
        Ok(Self(s))
    }

    /// Get the string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Did {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for Did {
    type Error = crate::Error;

    fn try_from(s: String) -> crate::Result<Self> {
        Self::new(s)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
