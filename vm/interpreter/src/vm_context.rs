// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Error, GasTracker, Invoker};
use actor::INIT_ACTOR_ADDR;
use address::Address;
use cid::{multihash::Code, Cid};
use ipld_blockstore::{BlockStore, BlockStoreExt};
use message::{Message, UnsignedMessage};
use runtime::{InvocationContext, Storage};
use state_tree::StateTree;
use std::cell::RefCell;
use std::rc::Rc;
use vm::{
    actor_error, ActorError, ChainEpoch, InvocOutput, MethodNum, Serialized, TokenAmount,
};

/// Per-invocation handle onto the callee actor's private storage sub-tree.
/// Created with the actor's current head; after the callee returns, the
/// caller propagates the handle's head back into the actor header.
pub struct StorageHandle<BS> {
    store: BS,
    head: Cid,
}

impl<BS> StorageHandle<BS>
where
    BS: BlockStore,
{
    pub fn new(store: BS, head: Cid) -> Self {
        Self { store, head }
    }
}

impl<BS> Storage for StorageHandle<BS>
where
    BS: BlockStore,
{
    fn put_raw(&mut self, bytes: Vec<u8>) -> Result<Cid, ActorError> {
        self.store
            .put_raw(bytes, Code::Blake2b256)
            .map_err(|e| actor_error!(SYS_INTERNAL; "storage put failed: {}", e))
    }

    fn get_raw(&self, cid: &Cid) -> Result<Vec<u8>, ActorError> {
        self.store
            .get_bytes(cid)
            .map_err(|e| actor_error!(SYS_INTERNAL; "storage get failed: {}", e))?
            .ok_or_else(|| actor_error!(SYS_NOT_FOUND; "blob {} not found", cid))
    }

    fn get_head(&self) -> Cid {
        self.head
    }

    fn commit(&mut self, old: &Cid, new: Cid) -> Result<(), ActorError> {
        if &self.head != old {
            return Err(actor_error!(SYS_INTERNAL;
                "failed to update, inconsistent base reference"));
        }

        self.head = new;
        Ok(())
    }
}

/// The execution environment of one invocation frame. Holds the pieces of the
/// VM a callee may touch: the state tree, the invoker for nested sends, the
/// session store, and the frame's storage handle. Nested sends construct
/// child contexts over the same state tree and gas meter, so the top-level
/// snapshot covers the whole transitive call tree.
pub struct VMContext<'a, BS> {
    state: &'a mut StateTree<BS>,
    inv: &'a Invoker<BS>,
    store: BS,
    msg: UnsignedMessage,
    epoch: ChainEpoch,
    gas: Rc<RefCell<GasTracker>>,
    storage: StorageHandle<BS>,
}

impl<'a, BS> VMContext<'a, BS>
where
    BS: BlockStore,
{
    pub(crate) fn new(
        state: &'a mut StateTree<BS>,
        inv: &'a Invoker<BS>,
        store: BS,
        msg: UnsignedMessage,
        epoch: ChainEpoch,
        gas: Rc<RefCell<GasTracker>>,
        sroot: Cid,
    ) -> Self {
        let storage = StorageHandle::new(store.clone(), sroot);
        Self {
            state,
            inv,
            store,
            msg,
            epoch,
            gas,
            storage,
        }
    }

    /// The storage root of this frame as left behind by the callee.
    pub fn storage_head(&self) -> Cid {
        self.storage.get_head()
    }
}

impl<BS> InvocationContext<BS> for VMContext<'_, BS>
where
    BS: BlockStore,
{
    fn message(&self) -> &UnsignedMessage {
        &self.msg
    }

    fn block_height(&self) -> ChainEpoch {
        self.epoch
    }

    fn storage(&mut self) -> &mut dyn Storage {
        &mut self.storage
    }

    fn store(&self) -> &BS {
        &self.store
    }

    fn gas_used(&self) -> TokenAmount {
        self.gas.borrow().gas_used().clone()
    }

    fn charge_gas(&mut self, amount: TokenAmount) -> Result<(), ActorError> {
        self.gas.borrow_mut().charge_gas(amount)
    }

    fn state_tree(&mut self) -> Result<&mut StateTree<BS>, ActorError> {
        if self.msg.to() != &*INIT_ACTOR_ADDR {
            return Err(actor_error!(SYS_FORBIDDEN;
                "only the init actor can access the state tree directly"));
        }

        Ok(self.state)
    }

    fn send(
        &mut self,
        to: &Address,
        method: MethodNum,
        value: TokenAmount,
        params: &Serialized,
    ) -> Result<InvocOutput, ActorError> {
        // The sub-message propagates the current frame's sender; value is
        // carried for the callee's inspection, movement happens at the top
        // level only.
        let msg = UnsignedMessage::builder()
            .from(*self.msg.from())
            .to(*to)
            .method_num(method)
            .value(value)
            .params(params.clone())
            .build()
            .map_err(|e| actor_error!(SYS_INTERNAL; "building sub-message: {}", e))?;

        // No implicit account creation inside a nested send; only the
        // top-level pipeline materializes account-key recipients.
        let to_act = self
            .state
            .get_actor(to)
            .map_err(|e| ActorError::new_fatal(e.to_string()))?
            .ok_or_else(|| actor_error!(SYS_NOT_FOUND; "actor {} not found", to))?;

        let out = {
            let mut sub = VMContext::new(
                &mut *self.state,
                self.inv,
                self.store.clone(),
                msg,
                self.epoch,
                Rc::clone(&self.gas),
                to_act.state,
            );
            let out = self
                .inv
                .invoke(&to_act, &mut sub, method, params)
                .map_err(|e| match e {
                    Error::Actor(e) => e,
                    other => ActorError::new_fatal(other.to_string()),
                })?;
            let new_head = sub.storage_head();

            self.state
                .mutate_actor(to, |act| {
                    act.state = new_head;
                    Ok(())
                })
                .map_err(|e| ActorError::new_fatal(e.to_string()))?;
            out
        };

        Ok(out)
    }
}
