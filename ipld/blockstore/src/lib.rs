// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod buffered;

pub use buffered::BufferedBlockStore;
pub use fvm_ipld_blockstore::Blockstore;

use cid::{
    multihash::{Code, MultihashDigest},
    Cid,
};
use db::Store;
use fvm_ipld_encoding::{de::DeserializeOwned, from_slice, ser::Serialize, to_vec, DAG_CBOR};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

pub trait BlockStore: Blockstore + Store + Clone {}
impl<T: Blockstore + Store + Clone> BlockStore for T {}

/// Extension methods for inserting and retrieving ipld data with Cids
pub trait BlockStoreExt: BlockStore {
    /// Get bytes from block store by Cid.
    fn get_bytes(&self, cid: &Cid) -> anyhow::Result<Option<Vec<u8>>> {
        self.get(cid)
    }

    /// Get typed object from block store by Cid.
    fn get_obj<T>(&self, cid: &Cid) -> anyhow::Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.get_bytes(cid)? {
            Some(bz) => Ok(Some(from_slice(&bz)?)),
            None => Ok(None),
        }
    }

    fn contains(&self, cid: &Cid) -> anyhow::Result<bool> {
        self.has(cid)
    }

    /// Put an object in the block store and return the Cid identifier.
    fn put_obj<S>(&self, obj: &S, code: Code) -> anyhow::Result<Cid>
    where
        S: Serialize,
    {
        let bytes = to_vec(obj)?;
        self.put_raw(bytes, code)
    }

    /// Put raw bytes in the block store and return the Cid identifier.
    fn put_raw(&self, bytes: Vec<u8>, code: Code) -> anyhow::Result<Cid> {
        let cid = Cid::new_v1(DAG_CBOR, code.digest(&bytes));
        self.put_keyed(&cid, &bytes)?;
        Ok(cid)
    }
}

impl<T: BlockStore> BlockStoreExt for T {}

/// Cooperative cancellation handle threaded through long store operations.
/// Flushing a buffered store checks it between node writes and aborts cleanly
/// without publishing a root.
#[derive(Debug, Default, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Block store error
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid link ({0}) in flushing buffered store")]
    MissingLink(Cid),
    #[error("Malformed block {cid}: {reason}")]
    InvalidBlock { cid: Cid, reason: String },
    #[error("Flush interrupted by cancellation")]
    Interrupted,
    #[error("{0}")]
    Other(anyhow::Error),
}

impl From<anyhow::Error> for Error {
    fn from(e: anyhow::Error) -> Self {
        Error::Other(e)
    }
}
