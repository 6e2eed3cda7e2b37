// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{Error, GasTracker, Invoker, MethodFn, VMContext};
use actor::{account, ACCOUNT_ACTOR_CODE_ID};
use address::{Address, Protocol};
use chain::ChainStore;
use cid::{multihash::Code, Cid};
use ipld_blockstore::{BlockStore, BlockStoreExt, BufferedBlockStore, CancelToken};
use log::debug;
use message::{Message, MessageReceipt, UnsignedMessage};
use num_traits::Zero;
use state_tree::StateTree;
use std::cell::RefCell;
use std::rc::Rc;
use vm::{ActorState, ChainEpoch, ExitCode, InvocOutput, Serialized, TokenAmount, METHOD_SEND};

/// The virtual machine: applies signed messages to a world state loaded from
/// a base root and publishes the result as a new root.
///
/// A VM is instantiated for exactly one block production or replay run. Its
/// state tree is mutated in memory through a sequence of `apply_message`
/// calls over a buffered store, then `flush`ed once; after flush the VM is
/// considered consumed.
pub struct VM<DB> {
    state: StateTree<BufferedBlockStore<DB>>,
    buf: BufferedBlockStore<DB>,
    base: Cid,
    epoch: ChainEpoch,
    miner: Address,
    inv: Invoker<BufferedBlockStore<DB>>,
}

impl<DB> VM<DB>
where
    DB: BlockStore,
{
    pub fn new(
        base: &Cid,
        epoch: ChainEpoch,
        miner: Address,
        chain: &ChainStore<DB>,
    ) -> Result<Self, Error> {
        let buf = BufferedBlockStore::new(chain.blockstore().clone());
        // Stage the canonical empty-object block so heads of actors created
        // during this session always resolve once the root is published.
        buf.put_raw(vm::EMPTY_ARR_BYTES.clone(), Code::Blake2b256)
            .map_err(|e| Error::Other(e.to_string()))?;
        let state = StateTree::new_from_root(buf.clone(), base)?;
        Ok(Self {
            state,
            buf,
            base: *base,
            epoch,
            miner,
            inv: Invoker::new(),
        })
    }

    /// The root this VM session was loaded from.
    pub fn base_root(&self) -> &Cid {
        &self.base
    }

    /// The epoch this VM applies messages in.
    pub fn epoch(&self) -> ChainEpoch {
        self.epoch
    }

    /// Returns a reference to the VM's state tree.
    pub fn state(&self) -> &StateTree<BufferedBlockStore<DB>> {
        &self.state
    }

    /// Mutable access to the state tree, for genesis setup and other
    /// VM-internal machinery outside the message path.
    pub fn state_mut(&mut self) -> &mut StateTree<BufferedBlockStore<DB>> {
        &mut self.state
    }

    /// Registers an actor method implementation beyond the builtin set. Part
    /// of VM construction; the registry must not change once messages are
    /// being applied.
    pub fn register_method(
        &mut self,
        code: Cid,
        method: u64,
        method_fn: MethodFn<BufferedBlockStore<DB>>,
    ) {
        self.inv.register(code, method, method_fn);
    }

    /// Applies the state transition for a single message and returns its
    /// receipt. Preflight failures and other hard errors abort with `Err` and
    /// leave the tree as it was; actor-level failures revert the message's
    /// effects, charge the gas actually burned, and surface through the
    /// receipt's exit code.
    pub fn apply_message(&mut self, msg: &UnsignedMessage) -> Result<MessageReceipt, Error> {
        check_message(msg)?;

        self.state.snapshot()?;
        let res = self.apply_message_inner(msg);
        if res.is_err() {
            // A hard failure must not alter the tree: an aborted message
            // contributes nothing to the next state root.
            self.state.revert_to_snapshot()?;
        }
        self.state.clear_snapshot();
        res
    }

    fn apply_message_inner(&mut self, msg: &UnsignedMessage) -> Result<MessageReceipt, Error> {
        let from_act = self
            .state
            .get_actor(msg.from())?
            .ok_or(Error::SenderNotFound(*msg.from()))?;

        let gas_cost = msg.gas_limit() * msg.gas_price();
        let total_cost = &gas_cost + msg.value();
        if from_act.balance < total_cost {
            return Err(Error::InsufficientFunds {
                balance: from_act.balance,
                required: total_cost,
            });
        }

        if msg.sequence() != from_act.sequence {
            return Err(Error::BadNonce {
                expected: from_act.sequence,
                got: msg.sequence(),
            });
        }

        self.state.mutate_actor(msg.from(), |act| {
            act.sequence += 1;
            Ok(())
        })?;

        let to_act = match self.state.get_actor(msg.to())? {
            Some(act) => act,
            None => try_create_account_actor(&mut self.state, msg.to())?,
        };

        // Affordability was proven above, so these transfers cannot fail.
        self.state
            .mutate_actor(msg.from(), |act| act.deduct_funds(&total_cost))
            .unwrap_or_else(|e| panic!("invariant violated: {}", e));
        self.state.mutate_actor(msg.to(), |act| {
            act.deposit_funds(msg.value());
            Ok(())
        })?;

        let mut gas_used = TokenAmount::zero();
        let (return_data, exit_code) = if msg.method_num() != METHOD_SEND {
            let (out, used) = self.invoke(&to_act, msg)?;
            gas_used = used;

            if out.exit_code.is_error() {
                // Revert all state changes since the snapshot. The sender
                // still pays for the gas burned, and its nonce still moves.
                self.state.revert_to_snapshot()?;
                let gas_fee = &gas_used * msg.gas_price();
                self.state
                    .mutate_actor(msg.from(), |act| {
                        act.sequence += 1;
                        act.deduct_funds(&gas_fee)
                    })
                    .unwrap_or_else(|e| panic!("invariant violated: {}", e));
            } else {
                // Refund unused gas.
                let refund = (msg.gas_limit() - &gas_used) * msg.gas_price();
                self.state.mutate_actor(msg.from(), |act| {
                    act.deposit_funds(&refund);
                    Ok(())
                })?;
            }
            (out.return_data, out.exit_code)
        } else {
            (Serialized::default(), ExitCode::OK)
        };

        // Reward the block producer with the gas fees. The miner actor must
        // exist even when the reward is zero.
        let gas_reward = &gas_used * msg.gas_price();
        self.state
            .mutate_actor(&self.miner, |act| {
                act.deposit_funds(&gas_reward);
                Ok(())
            })
            .map_err(|e| match e {
                state_tree::Error::ActorNotFound(addr) => Error::MinerNotFound(addr),
                other => other.into(),
            })?;

        Ok(MessageReceipt {
            exit_code,
            return_data,
            gas_used,
        })
    }

    /// Applies a system-originated message outside the normal preflight: no
    /// nonce check and no gas accounting. Value still moves and a failing
    /// invocation still reverts. Used for genesis setup and rewards outside
    /// the chain message path.
    pub fn apply_implicit_message(&mut self, msg: &UnsignedMessage) -> Result<MessageReceipt, Error> {
        self.state.snapshot()?;
        let res = self.apply_implicit_inner(msg);
        if res.is_err() {
            self.state.revert_to_snapshot()?;
        }
        self.state.clear_snapshot();
        res
    }

    fn apply_implicit_inner(&mut self, msg: &UnsignedMessage) -> Result<MessageReceipt, Error> {
        let from_act = self
            .state
            .get_actor(msg.from())?
            .ok_or(Error::SenderNotFound(*msg.from()))?;

        if &from_act.balance < msg.value() {
            return Err(Error::InsufficientFunds {
                balance: from_act.balance,
                required: msg.value().clone(),
            });
        }

        let to_act = match self.state.get_actor(msg.to())? {
            Some(act) => act,
            None => try_create_account_actor(&mut self.state, msg.to())?,
        };

        if !msg.value().is_zero() {
            self.state
                .mutate_actor(msg.from(), |act| act.deduct_funds(msg.value()))
                .unwrap_or_else(|e| panic!("invariant violated: {}", e));
            self.state.mutate_actor(msg.to(), |act| {
                act.deposit_funds(msg.value());
                Ok(())
            })?;
        }

        let (return_data, exit_code) = if msg.method_num() != METHOD_SEND {
            let (out, _) = self.invoke(&to_act, msg)?;
            if out.exit_code.is_error() {
                self.state.revert_to_snapshot()?;
            }
            (out.return_data, out.exit_code)
        } else {
            (Serialized::default(), ExitCode::OK)
        };

        Ok(MessageReceipt {
            exit_code,
            return_data,
            gas_used: TokenAmount::zero(),
        })
    }

    /// Dispatches a method invocation against an actor in a fresh context
    /// built from the frame message. Returns the invocation output together
    /// with the gas consumed by the whole call tree.
    pub fn invoke(
        &mut self,
        act: &ActorState,
        msg: &UnsignedMessage,
    ) -> Result<(InvocOutput, TokenAmount), Error> {
        let gas = Rc::new(RefCell::new(GasTracker::new(
            msg.gas_limit().clone(),
            TokenAmount::zero(),
        )));

        let method = msg.method_num();
        let params = msg.params().clone();
        let to = *msg.to();

        let out = {
            let mut ctx = VMContext::new(
                &mut self.state,
                &self.inv,
                self.buf.clone(),
                msg.clone(),
                self.epoch,
                Rc::clone(&gas),
                act.state,
            );
            let out = self.inv.invoke(act, &mut ctx, method, &params)?;
            let new_head = ctx.storage_head();

            // Propagate the callee's storage head back onto its header.
            self.state.mutate_actor(&to, |act| {
                act.state = new_head;
                Ok(())
            })?;
            out
        };

        let gas_used = gas.borrow().gas_used().clone();
        if out.exit_code.is_error() {
            debug!(
                "[from={}, to={}, method={}] invocation exited with code {}",
                msg.from(),
                msg.to(),
                method,
                out.exit_code
            );
        }
        Ok((out, gas_used))
    }

    /// A VM-privileged transfer between two actors, bypassing nonces and gas.
    /// Only for VM-internal machinery such as genesis setup or block rewards
    /// outside the normal message path.
    pub fn transfer_funds(
        &mut self,
        from: &Address,
        to: &Address,
        amount: &TokenAmount,
    ) -> Result<(), Error> {
        if from == to {
            return Ok(());
        }

        let mut from_act = self
            .state
            .get_actor(from)?
            .ok_or(Error::ActorNotFound(*from))?;
        let mut to_act = self.state.get_actor(to)?.ok_or(Error::ActorNotFound(*to))?;

        from_act
            .deduct_funds(amount)
            .map_err(|_| Error::InsufficientFunds {
                balance: from_act.balance.clone(),
                required: amount.clone(),
            })?;
        to_act.deposit_funds(amount);

        self.state.set_actor(from, from_act)?;
        self.state.set_actor(to, to_act)?;

        Ok(())
    }

    /// Publishes the session: materializes the state tree to a root Cid and
    /// copies the DAG below it from the buffered overlay into the durable
    /// store. Cancellation aborts cleanly between node copies without
    /// returning a root.
    pub fn flush(&mut self, cancel: &CancelToken) -> Result<Cid, Error> {
        let root = self.state.flush()?;
        self.buf.flush(&root, cancel)?;
        Ok(root)
    }
}

/// Does some basic checks on the message to see if the fields are valid.
fn check_message(msg: &UnsignedMessage) -> Result<(), Error> {
    if msg.gas_limit().is_zero() {
        return Err(Error::InvalidMessage("Message has no gas limit set"));
    }

    Ok(())
}

/// Installs a fresh account actor for an address of the account-key class.
/// Recipients of any other class cannot be materialized implicitly.
pub fn try_create_account_actor<BS>(
    state: &mut StateTree<BS>,
    addr: &Address,
) -> Result<ActorState, Error>
where
    BS: BlockStore,
{
    if addr.protocol() != Protocol::Key {
        return Err(Error::RecipientNotCreatable(*addr));
    }

    let head = state
        .store()
        .put_obj(&account::State { address: *addr }, Code::Blake2b256)
        .map_err(|e| Error::Other(e.to_string()))?;

    let act = ActorState::new(*ACCOUNT_ACTOR_CODE_ID, head, TokenAmount::zero(), 0);
    state.set_actor(addr, act.clone())?;

    Ok(act)
}
