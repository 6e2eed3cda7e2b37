// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fvm_ipld_encoding::{de::DeserializeOwned, from_slice, to_vec, Error};
use serde::{Deserialize, Serialize};

/// Method number indicator for calling actor methods.
pub type MethodNum = u64;

/// Reserved method number for a plain value transfer. Never dispatched to an
/// actor; the message pipeline short-circuits it.
pub const METHOD_SEND: MethodNum = 0;

/// Base method number for an actor constructor.
pub const METHOD_CONSTRUCTOR: MethodNum = 1;

/// Serialized bytes to be used as parameters into actor methods and as their
/// return payload.
#[derive(Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Serialized {
    #[serde(with = "serde_bytes")]
    bytes: Vec<u8>,
}

impl std::fmt::Debug for Serialized {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Serialized {{ len: {} }}", self.bytes.len())
    }
}

impl Serialized {
    /// Constructor if data is encoded already.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Contructor for encoding Cbor encodable structure.
    pub fn serialize<O: Serialize>(obj: O) -> Result<Self, Error> {
        Ok(Self {
            bytes: to_vec(&obj)?,
        })
    }

    /// Returns serialized bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns true if the byte payload is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Deserializes the serialized bytes into a defined type.
    pub fn deserialize<O: DeserializeOwned>(&self) -> Result<O, Error> {
        from_slice(&self.bytes)
    }
}

impl From<Vec<u8>> for Serialized {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialized_roundtrip() {
        let params = Serialized::serialize((42u64, "loam")).unwrap();
        let (num, name): (u64, String) = params.deserialize().unwrap();
        assert_eq!(num, 42);
        assert_eq!(name, "loam");
    }
}
