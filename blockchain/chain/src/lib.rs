// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::Cid;
use ipld_blockstore::BlockStore;
use log::info;
use parking_lot::RwLock;

/// Owns the durable block store a VM session flushes into and tracks the
/// latest published state root. Block and tipset bookkeeping beyond that is
/// handled by the consensus layer, not here.
pub struct ChainStore<DB> {
    db: DB,
    head_root: RwLock<Option<Cid>>,
}

impl<DB> ChainStore<DB>
where
    DB: BlockStore,
{
    pub fn new(db: DB) -> Self {
        Self {
            db,
            head_root: RwLock::new(None),
        }
    }

    /// Returns the underlying block store the VM buffers over.
    pub fn blockstore(&self) -> &DB {
        &self.db
    }

    /// Records a freshly flushed state root as the new head.
    pub fn set_head_root(&self, root: Cid) {
        info!("chain store head advanced to {}", root);
        *self.head_root.write() = Some(root);
    }

    /// The most recently published state root, if any.
    pub fn head_root(&self) -> Option<Cid> {
        *self.head_root.read()
    }
}
