// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod state;

pub use self::state::State;

use ipld_blockstore::BlockStore;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use runtime::{InvocationContext, StorageExt};
use vm::{
    actor_error, ActorError, ActorState, InvocOutput, MethodNum, Serialized, METHOD_CONSTRUCTOR,
};

/// Account actor methods available
#[derive(FromPrimitive)]
#[repr(u64)]
pub enum Method {
    Constructor = METHOD_CONSTRUCTOR,
}

impl Method {
    /// Converts a method number into a Method enum
    pub fn from_method_num(m: MethodNum) -> Option<Method> {
        FromPrimitive::from_u64(m)
    }
}

/// Account actor constructor: records the public key address the account is
/// reachable at.
pub fn constructor<BS: BlockStore>(
    _act: &ActorState,
    ctx: &mut dyn InvocationContext<BS>,
    params: &Serialized,
) -> Result<InvocOutput, ActorError> {
    let address = params
        .deserialize()
        .map_err(|e| actor_error!(SYS_ILLEGAL_ARGUMENT; "invalid account address param: {}", e))?;

    let storage = ctx.storage();
    let head = storage.get_head();
    let new_head = storage.put(&State { address })?;
    storage.commit(&head, new_head)?;

    Ok(InvocOutput::empty())
}
