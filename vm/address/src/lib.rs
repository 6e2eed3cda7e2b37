// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod errors;
mod payload;
mod protocol;

pub use self::errors::Error;
pub use self::payload::Payload;
pub use self::protocol::Protocol;

use data_encoding::Encoding;
use data_encoding_macro::new_encoding;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use serde_bytes::ByteBuf;
use std::fmt;
use std::str::FromStr;

/// Hash length of payload for Key and Contract addresses.
pub const PAYLOAD_HASH_LEN: usize = 20;

/// Length of the checksum hash for string encodings.
pub const CHECKSUM_HASH_LEN: usize = 4;

/// Longest encoded byte form of an address: a protocol tag plus a hash payload.
pub const MAX_ADDRESS_LEN: usize = PAYLOAD_HASH_LEN + 1;

/// Prefix character of the string address form.
pub const ADDRESS_PREFIX: &str = "o";

/// Custom lowercase base32 alphabet used for the string address form.
const ADDRESS_ENCODER: Encoding = new_encoding! {
    symbols: "abcdefghijklmnopqrstuvwxyz234567",
    padding: None,
};

/// Address of a ledger entity. The protocol tag determines whether a missing
/// actor at this address may be created implicitly (only the Key class) and
/// how the payload is interpreted.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Address {
    payload: Payload,
}

impl Address {
    /// Generates an ID protocol address for the given numeric handle.
    pub fn new_id(id: u64) -> Self {
        Self {
            payload: Payload::ID(id),
        }
    }

    /// Generates a Key protocol address by hashing an account public key.
    pub fn new_key(pubkey: &[u8]) -> Self {
        Self {
            payload: Payload::Key(address_hash(pubkey)),
        }
    }

    /// Generates a Contract protocol address by hashing creation context data.
    pub fn new_contract(data: &[u8]) -> Self {
        Self {
            payload: Payload::Contract(address_hash(data)),
        }
    }

    /// Decodes an address from its byte form (protocol tag plus payload).
    pub fn from_bytes(bz: &[u8]) -> Result<Self, Error> {
        if bz.len() < 2 {
            return Err(Error::InvalidLength);
        }
        let protocol = Protocol::from_byte(bz[0]).ok_or(Error::UnknownProtocol)?;
        Ok(Self {
            payload: Payload::from_raw_bytes(protocol, &bz[1..])?,
        })
    }

    /// Returns the address in byte form: protocol tag followed by the payload.
    pub fn to_bytes(self) -> Vec<u8> {
        let mut bz = self.payload.to_raw_bytes();
        bz.insert(0, self.protocol() as u8);
        bz
    }

    /// Returns the protocol class of the address.
    pub fn protocol(&self) -> Protocol {
        self.payload.protocol()
    }

    /// Returns the address payload.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Returns the numeric handle of an ID address.
    pub fn id(&self) -> Result<u64, Error> {
        match self.payload {
            Payload::ID(id) => Ok(id),
            _ => Err(Error::NonIDAddress),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.payload {
            Payload::ID(id) => write!(f, "{}{}{}", ADDRESS_PREFIX, self.protocol(), id),
            Payload::Key(_) | Payload::Contract(_) => {
                let raw = self.payload.to_raw_bytes();
                let mut ingest = Vec::with_capacity(raw.len() + 1);
                ingest.push(self.protocol() as u8);
                ingest.extend_from_slice(&raw);

                let mut bz = raw;
                bz.extend_from_slice(&checksum(&ingest));
                write!(
                    f,
                    "{}{}{}",
                    ADDRESS_PREFIX,
                    self.protocol(),
                    ADDRESS_ENCODER.encode(&bz)
                )
            }
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        let rest = s.strip_prefix(ADDRESS_PREFIX).ok_or(Error::InvalidPrefix)?;
        if rest.len() < 2 {
            return Err(Error::InvalidLength);
        }
        let tag = match rest.as_bytes()[0] {
            digit @ b'0'..=b'9' => digit - b'0',
            _ => return Err(Error::UnknownProtocol),
        };
        let protocol = Protocol::from_byte(tag).ok_or(Error::UnknownProtocol)?;
        let body = &rest[1..];

        match protocol {
            Protocol::ID => {
                let id = body.parse::<u64>().map_err(|_| Error::InvalidPayload)?;
                Ok(Address::new_id(id))
            }
            Protocol::Key | Protocol::Contract => {
                let bz = ADDRESS_ENCODER
                    .decode(body.as_bytes())
                    .map_err(|e| Error::Base32Decoding(e.to_string()))?;
                if bz.len() != PAYLOAD_HASH_LEN + CHECKSUM_HASH_LEN {
                    return Err(Error::InvalidLength);
                }
                let (payload, cksm) = bz.split_at(PAYLOAD_HASH_LEN);

                let mut ingest = Vec::with_capacity(payload.len() + 1);
                ingest.push(protocol as u8);
                ingest.extend_from_slice(payload);
                if !validate_checksum(&ingest, cksm.to_vec()) {
                    return Err(Error::InvalidChecksum);
                }

                Ok(Address {
                    payload: Payload::from_raw_bytes(protocol, payload)?,
                })
            }
        }
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serde_bytes::Bytes::new(&self.to_bytes()).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bz: ByteBuf = Deserialize::deserialize(deserializer)?;
        Address::from_bytes(&bz).map_err(de::Error::custom)
    }
}

/// Checksum calculates the 4 byte checksum hash
pub fn checksum(ingest: &[u8]) -> Vec<u8> {
    blake2b_variable(ingest, CHECKSUM_HASH_LEN)
}

/// Validates the checksum against the ingest data
pub fn validate_checksum(ingest: &[u8], expect: Vec<u8>) -> bool {
    let digest = checksum(ingest);
    digest == expect
}

/// Returns a 20 byte hash of the data used for Key and Contract payloads.
fn address_hash(ingest: &[u8]) -> [u8; PAYLOAD_HASH_LEN] {
    let digest = blake2b_variable(ingest, PAYLOAD_HASH_LEN);
    digest.try_into().expect("fixed hash length")
}

fn blake2b_variable(ingest: &[u8], length: usize) -> Vec<u8> {
    blake2b_simd::Params::new()
        .hash_length(length)
        .hash(ingest)
        .as_bytes()
        .to_vec()
}
