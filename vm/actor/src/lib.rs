// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

#[macro_use]
extern crate lazy_static;

mod builtin;

pub use self::builtin::*;
pub use vm::{ActorState, Serialized};

/// Bit width of HAMT maps kept inside actor state.
pub(crate) const HAMT_BIT_WIDTH: u32 = 5;
