// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use address::Address;
use cid::Cid;
use fvm_ipld_hamt::{BytesKey, Hamt};
use ipld_blockstore::BlockStore;
use log::trace;
use thiserror::Error;
use vm::ActorState;

/// Bit width of the HAMT nodes backing the state tree.
const HAMT_BIT_WIDTH: u32 = 5;

/// State tree error
#[derive(Debug, Error)]
pub enum Error {
    #[error("State root {0} not found in store")]
    RootNotFound(Cid),
    #[error("No snapshot to revert to")]
    NoSnapshot,
    #[error("Cannot flush state tree with an unresolved snapshot")]
    UnresolvedSnapshot,
    #[error("Actor for address {0} does not exist")]
    ActorNotFound(Address),
    #[error("{0}")]
    Hamt(String),
    #[error("{0}")]
    Other(String),
}

impl From<fvm_ipld_hamt::Error> for Error {
    fn from(e: fvm_ipld_hamt::Error) -> Self {
        Error::Hamt(e.to_string())
    }
}

/// The world state: a persistent mapping from address to actor header,
/// implemented as a hash-array-mapped trie over a content-addressed store.
/// A single root Cid summarizes the whole mapping.
///
/// Supports a single-slot snapshot: `snapshot` materializes the current
/// mapping to a root and remembers it, `revert_to_snapshot` reloads the
/// mapping from that root. Message application takes one snapshot at the top
/// level; nested calls share it.
pub struct StateTree<S> {
    hamt: Hamt<S, ActorState>,
    store: S,
    snapshot: Option<Cid>,
}

impl<S> StateTree<S>
where
    S: BlockStore,
{
    /// Constructor for an empty state tree.
    pub fn new(store: S) -> Self {
        let hamt = Hamt::new_with_bit_width(store.clone(), HAMT_BIT_WIDTH);
        Self {
            hamt,
            store,
            snapshot: None,
        }
    }

    /// Constructor for a state tree given an IPLD store and a prior root.
    pub fn new_from_root(store: S, root: &Cid) -> Result<Self, Error> {
        let hamt = Hamt::load_with_bit_width(root, store.clone(), HAMT_BIT_WIDTH)
            .map_err(|_| Error::RootNotFound(*root))?;
        Ok(Self {
            hamt,
            store,
            snapshot: None,
        })
    }

    /// Retrieve store reference to modify db.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Get actor state from an address.
    pub fn get_actor(&self, addr: &Address) -> Result<Option<ActorState>, Error> {
        Ok(self.hamt.get(&BytesKey(addr.to_bytes()))?.cloned())
    }

    /// Set actor state for an address.
    pub fn set_actor(&mut self, addr: &Address, actor: ActorState) -> Result<(), Error> {
        self.hamt.set(BytesKey(addr.to_bytes()), actor)?;
        Ok(())
    }

    /// Delete actor for an address.
    pub fn delete_actor(&mut self, addr: &Address) -> Result<(), Error> {
        self.hamt.delete(&BytesKey(addr.to_bytes()))?;
        Ok(())
    }

    /// Mutate and set actor state for an Address. Fails if no actor exists at
    /// the address.
    pub fn mutate_actor<F>(&mut self, addr: &Address, mutate: F) -> Result<(), Error>
    where
        F: FnOnce(&mut ActorState) -> Result<(), String>,
    {
        let mut act = self
            .get_actor(addr)?
            .ok_or(Error::ActorNotFound(*addr))?;

        mutate(&mut act).map_err(Error::Other)?;

        self.set_actor(addr, act)
    }

    /// Record the current mapping as the restore point. Materializes the trie
    /// so the restore point survives arbitrary in-memory mutation.
    pub fn snapshot(&mut self) -> Result<(), Error> {
        let root = self.hamt.flush()?;
        trace!("state tree snapshot at {}", root);
        self.snapshot = Some(root);
        Ok(())
    }

    /// Restore the mapping to the recorded snapshot. The snapshot stays armed
    /// until cleared, so a caller may revert and continue mutating within the
    /// same transaction.
    pub fn revert_to_snapshot(&mut self) -> Result<(), Error> {
        let root = self.snapshot.ok_or(Error::NoSnapshot)?;
        self.hamt = Hamt::load_with_bit_width(&root, self.store.clone(), HAMT_BIT_WIDTH)
            .map_err(|_| Error::RootNotFound(root))?;
        trace!("state tree reverted to {}", root);
        Ok(())
    }

    /// Drop the recorded snapshot.
    pub fn clear_snapshot(&mut self) {
        self.snapshot = None;
    }

    /// Flush state tree and return the root Cid.
    pub fn flush(&mut self) -> Result<Cid, Error> {
        if self.snapshot.is_some() {
            return Err(Error::UnresolvedSnapshot);
        }
        Ok(self.hamt.flush()?)
    }
}
