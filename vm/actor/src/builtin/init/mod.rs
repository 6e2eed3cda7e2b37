// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod state;

pub use self::state::State;

use crate::{is_builtin_actor, is_singleton_actor};
use address::Address;
use cid::Cid;
use fvm_ipld_encoding::tuple::*;
use ipld_blockstore::BlockStore;
use message::Message;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use runtime::{InvocationContext, StorageExt};
use vm::{
    actor_error, ActorError, ActorState, Cbor, InvocOutput, MethodNum, Serialized, TokenAmount,
    EMPTY_ARR_CID, METHOD_CONSTRUCTOR,
};

/// Init actor methods available
#[derive(FromPrimitive)]
#[repr(u64)]
pub enum Method {
    Constructor = METHOD_CONSTRUCTOR,
    Exec = 2,
}

impl Method {
    /// Converts a method number into a Method enum
    pub fn from_method_num(m: MethodNum) -> Option<Method> {
        FromPrimitive::from_u64(m)
    }
}

/// Init actor constructor parameters
#[derive(Serialize_tuple, Deserialize_tuple)]
pub struct ConstructorParams {
    pub network_name: String,
}

/// Exec parameters
#[derive(Serialize_tuple, Deserialize_tuple)]
pub struct ExecParams {
    pub code_cid: Cid,
    pub constructor_params: Serialized,
}

/// Exec return value
#[derive(Serialize_tuple, Deserialize_tuple, Debug, PartialEq, Eq)]
pub struct ExecReturn {
    /// ID address the new actor lives at.
    pub id_address: Address,
    /// Reorg-safe address the new actor is also known by.
    pub robust_address: Address,
}

impl Cbor for ExecReturn {}

/// Init actor constructor: seeds the address map.
pub fn constructor<BS: BlockStore>(
    _act: &ActorState,
    ctx: &mut dyn InvocationContext<BS>,
    params: &Serialized,
) -> Result<InvocOutput, ActorError> {
    let ConstructorParams { network_name } = params
        .deserialize()
        .map_err(|e| actor_error!(SYS_ILLEGAL_ARGUMENT; "invalid init constructor params: {}", e))?;

    let empty_map = State::empty_map(ctx.store())
        .map_err(|e| actor_error!(SYS_INTERNAL; "failed to seed address map: {}", e))?;
    let st = State::new(empty_map, network_name);

    let storage = ctx.storage();
    let head = storage.get_head();
    let new_head = storage.put(&st)?;
    storage.commit(&head, new_head)?;

    Ok(InvocOutput::empty())
}

/// Creates a new actor entry: assigns it an ID address, records a mapping
/// from a freshly derived robust address, installs the header in the state
/// tree through the privileged capability, and invokes the new actor's
/// constructor.
pub fn exec<BS: BlockStore>(
    _act: &ActorState,
    ctx: &mut dyn InvocationContext<BS>,
    params: &Serialized,
) -> Result<InvocOutput, ActorError> {
    let ExecParams {
        code_cid,
        constructor_params,
    } = params
        .deserialize()
        .map_err(|e| actor_error!(SYS_ILLEGAL_ARGUMENT; "invalid exec params: {}", e))?;

    if !is_builtin_actor(&code_cid) {
        return Err(actor_error!(SYS_FORBIDDEN; "can only create builtin actors"));
    }
    if is_singleton_actor(&code_cid) {
        return Err(actor_error!(SYS_FORBIDDEN; "cannot create singleton actor {}", code_cid));
    }

    let head = ctx.storage().get_head();
    let mut st: State = ctx.storage().get(&head)?;

    // A robust address stays stable across chain reorgs, unlike the ID
    // handle assigned below.
    let robust_address = derive_robust_address(ctx.message(), st.next_id);

    let id_address = st
        .map_address_to_new_id(ctx.store(), &robust_address)
        .map_err(|e| actor_error!(SYS_INTERNAL; "failed to allocate id address: {}", e))?;

    let storage = ctx.storage();
    let new_head = storage.put(&st)?;
    storage.commit(&head, new_head)?;

    let tree = ctx.state_tree()?;
    if tree
        .get_actor(&id_address)
        .map_err(|e| ActorError::new_fatal(e.to_string()))?
        .is_some()
    {
        return Err(actor_error!(fatal("attempt to create actor over existing {}", id_address)));
    }
    tree.set_actor(
        &id_address,
        ActorState::new(code_cid, *EMPTY_ARR_CID, TokenAmount::default(), 0),
    )
    .map_err(|e| ActorError::new_fatal(e.to_string()))?;

    let ret = ctx.send(
        &id_address,
        METHOD_CONSTRUCTOR,
        TokenAmount::default(),
        &constructor_params,
    )?;
    if ret.exit_code.is_error() {
        // Constructor failure surfaces as this invocation's failure; the
        // top-level snapshot rolls the entry back.
        return Ok(InvocOutput {
            exit_code: ret.exit_code,
            return_data: Serialized::default(),
        });
    }

    let ret_data = Serialized::serialize(ExecReturn {
        id_address,
        robust_address,
    })?;
    Ok(InvocOutput::ok(ret_data))
}

/// Computes a reorg-safe address for an actor created by the given message:
/// a hash over the creating sender, its nonce, and the allocation counter.
fn derive_robust_address(msg: &message::UnsignedMessage, counter: u64) -> Address {
    let mut b = msg.from().to_bytes();
    b.extend_from_slice(&msg.sequence().to_be_bytes());
    b.extend_from_slice(&counter.to_be_bytes());
    Address::new_contract(&b)
}
