// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use num_bigint::BigUint;

/// Token amount carried by messages and actor balances. Unsigned by
/// construction: no actor can hold a negative balance, and debits that would
/// underflow are rejected instead of going negative.
pub type TokenAmount = BigUint;

/// Serde serialization for unsigned big integers as minimal big-endian bytes.
/// Zero encodes as the empty byte string.
pub mod biguint_ser {
    use num_bigint::BigUint;
    use num_traits::Zero;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_bytes::{ByteBuf, Bytes};

    pub fn serialize<S>(int: &BigUint, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let bz = if int.is_zero() {
            Vec::new()
        } else {
            int.to_bytes_be()
        };
        Bytes::new(&bz).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigUint, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bz: ByteBuf = Deserialize::deserialize(deserializer)?;
        if bz.is_empty() {
            return Ok(BigUint::zero());
        }
        Ok(BigUint::from_bytes_be(&bz))
    }

    /// Wrapper for serializing a big integer reference with the module.
    #[derive(Serialize)]
    #[serde(transparent)]
    pub struct BigUintSer<'a>(#[serde(with = "self")] pub &'a BigUint);

    /// Wrapper for deserializing a big integer with the module.
    #[derive(Deserialize, Serialize, Clone, Default)]
    #[serde(transparent)]
    pub struct BigUintDe(#[serde(with = "self")] pub BigUint);
}
