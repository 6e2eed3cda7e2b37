// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use std::fmt;

/// Protocol defines the address class: how the payload is interpreted and
/// whether the ledger may materialize an actor for the address on demand.
#[derive(PartialEq, Eq, Copy, Clone, FromPrimitive, Debug, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Protocol {
    /// ID protocol addressing: a compact numeric handle assigned by the init
    /// actor.
    ID = 0,
    /// Key protocol: the hash of an account public key. The only class that
    /// may be lazily materialized as an account actor.
    Key = 1,
    /// Contract protocol: a hash derived from the creating context; such
    /// actors only come into existence through explicit creation.
    Contract = 2,
}

impl Protocol {
    /// Returns the protocol for the byte tag, if valid.
    pub fn from_byte(b: u8) -> Option<Protocol> {
        FromPrimitive::from_u8(b)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}
