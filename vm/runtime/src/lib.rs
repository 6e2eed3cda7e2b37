// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use address::Address;
use cid::Cid;
use fvm_ipld_encoding::{de::DeserializeOwned, from_slice, ser::Serialize, to_vec};
use ipld_blockstore::BlockStore;
use message::UnsignedMessage;
use state_tree::StateTree;
use vm::{ActorError, ChainEpoch, InvocOutput, MethodNum, Serialized, TokenAmount};

/// Storage provides access to an actor's private storage sub-tree during one
/// invocation. Puts are purely additive; the head only moves through
/// `commit`, which refuses to replace a head it was not told about.
pub trait Storage {
    /// Serialized bytes are written to the store and identified by the
    /// returned Cid.
    fn put_raw(&mut self, bytes: Vec<u8>) -> Result<Cid, ActorError>;

    /// Reads the raw bytes stored at the Cid. Fails when the Cid is absent
    /// from both the session overlay and the base store.
    fn get_raw(&self, cid: &Cid) -> Result<Vec<u8>, ActorError>;

    /// The actor's current storage root as seen by this invocation.
    fn get_head(&self) -> Cid;

    /// Compare-and-set the storage head. Fails when `old` is not the current
    /// head, catching forked storage graphs inside a single invocation chain.
    fn commit(&mut self, old: &Cid, new: Cid) -> Result<(), ActorError>;
}

/// Typed convenience methods over any [`Storage`].
pub trait StorageExt: Storage {
    /// Serialize the value into the store and return its Cid.
    fn put<T: Serialize>(&mut self, obj: &T) -> Result<Cid, ActorError> {
        let bytes = to_vec(obj)?;
        self.put_raw(bytes)
    }

    /// Decode the blob at the Cid.
    fn get<T: DeserializeOwned>(&self, cid: &Cid) -> Result<T, ActorError> {
        Ok(from_slice(&self.get_raw(cid)?)?)
    }
}

impl<T: Storage + ?Sized> StorageExt for T {}

/// The execution environment handed to an actor method: the incoming message,
/// chain position, private storage, the gas meter, and the capability to
/// invoke other actors.
pub trait InvocationContext<BS: BlockStore> {
    /// The message that kicked off the current invocation (the frame message,
    /// not necessarily the top-level chain message).
    fn message(&self) -> &UnsignedMessage;

    /// The height of the block this message is applied in.
    fn block_height(&self) -> ChainEpoch;

    /// Access to the actor's private storage sub-tree.
    fn storage(&mut self) -> &mut dyn Storage;

    /// Reference to the session block store, for actor state structures that
    /// maintain their own linked data (maps, arrays).
    fn store(&self) -> &BS;

    /// Gas consumed so far by this invocation chain.
    fn gas_used(&self) -> TokenAmount;

    /// Consume gas; fails with an out-of-gas error once the message's gas
    /// limit is reached.
    fn charge_gas(&mut self, amount: TokenAmount) -> Result<(), ActorError>;

    /// Privileged access to the whole state tree. Permitted only when the
    /// callee is the init actor; everyone else is refused.
    fn state_tree(&mut self) -> Result<&mut StateTree<BS>, ActorError>;

    /// Invoke a method on another actor. The sub-message propagates the
    /// current frame's sender; the attached value is visible to the callee
    /// but is not moved by the send itself.
    fn send(
        &mut self,
        to: &Address,
        method: MethodNum,
        value: TokenAmount,
        params: &Serialized,
    ) -> Result<InvocOutput, ActorError>;
}
