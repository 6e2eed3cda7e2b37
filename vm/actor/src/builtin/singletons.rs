// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use address::Address;

lazy_static! {
    /// The actor system-originated messages are sent from.
    pub static ref SYSTEM_ACTOR_ADDR: Address = Address::new_id(0);

    /// The actor responsible for creating new actor entries; the only callee
    /// granted direct state-tree access.
    pub static ref INIT_ACTOR_ADDR: Address = Address::new_id(1);
}

/// ID addresses below this value are reserved for singleton system actors.
pub const FIRST_NON_SINGLETON_ID: u64 = 100;
