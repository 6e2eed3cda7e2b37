// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Error, Protocol, PAYLOAD_HASH_LEN};

/// Payload of an address: the protocol-specific data that, together with the
/// protocol tag, uniquely identifies a ledger entity.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Payload {
    /// ID protocol address.
    ID(u64),
    /// Key protocol address: hash of an account public key.
    Key([u8; PAYLOAD_HASH_LEN]),
    /// Contract protocol address: hash derived from the creating context.
    Contract([u8; PAYLOAD_HASH_LEN]),
}

impl Payload {
    /// Returns the protocol class of the payload.
    pub fn protocol(&self) -> Protocol {
        match self {
            Payload::ID(_) => Protocol::ID,
            Payload::Key(_) => Protocol::Key,
            Payload::Contract(_) => Protocol::Contract,
        }
    }

    /// Returns the payload as encoded bytes, without the protocol tag.
    pub fn to_raw_bytes(self) -> Vec<u8> {
        match self {
            Payload::ID(id) => {
                let mut buf = unsigned_varint::encode::u64_buffer();
                unsigned_varint::encode::u64(id, &mut buf).to_vec()
            }
            Payload::Key(hash) => hash.to_vec(),
            Payload::Contract(hash) => hash.to_vec(),
        }
    }

    /// Decodes a payload for the given protocol from its raw byte form.
    pub fn from_raw_bytes(protocol: Protocol, bz: &[u8]) -> Result<Self, Error> {
        let payload = match protocol {
            Protocol::ID => {
                let (id, remaining) =
                    unsigned_varint::decode::u64(bz).map_err(|_| Error::InvalidPayload)?;
                if !remaining.is_empty() {
                    return Err(Error::InvalidPayload);
                }
                Payload::ID(id)
            }
            Protocol::Key => {
                Payload::Key(bz.try_into().map_err(|_| Error::InvalidLength)?)
            }
            Protocol::Contract => {
                Payload::Contract(bz.try_into().map_err(|_| Error::InvalidLength)?)
            }
        };
        Ok(payload)
    }
}
