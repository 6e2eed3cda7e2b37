// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{FIRST_NON_SINGLETON_ID, HAMT_BIT_WIDTH};
use address::{Address, Protocol};
use anyhow::Context;
use cid::Cid;
use fvm_ipld_encoding::tuple::*;
use fvm_ipld_hamt::{BytesKey, Hamt};
use ipld_blockstore::BlockStore;
use vm::Cbor;

/// State is responsible for creating actor entries: it tracks the next
/// available ID handle and the mapping from robust addresses to the ID
/// addresses actors live at.
#[derive(PartialEq, Eq, Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct State {
    pub address_map: Cid,
    pub next_id: u64,
    pub network_name: String,
}

impl State {
    pub fn new(address_map: Cid, network_name: String) -> Self {
        Self {
            address_map,
            next_id: FIRST_NON_SINGLETON_ID,
            network_name,
        }
    }

    /// Flushes an empty address map to the store, for constructing a fresh
    /// init state.
    pub fn empty_map<BS: BlockStore>(store: &BS) -> anyhow::Result<Cid> {
        Hamt::<BS, u64>::new_with_bit_width(store.clone(), HAMT_BIT_WIDTH)
            .flush()
            .context("flushing empty address map")
    }

    /// Allocates a new ID address and stores a mapping of the argument
    /// address to it.
    pub fn map_address_to_new_id<BS: BlockStore>(
        &mut self,
        store: &BS,
        addr: &Address,
    ) -> anyhow::Result<Address> {
        let id = self.next_id;
        self.next_id += 1;

        let mut map: Hamt<BS, u64> =
            Hamt::load_with_bit_width(&self.address_map, store.clone(), HAMT_BIT_WIDTH)
                .context("loading address map")?;
        map.set(BytesKey(addr.to_bytes()), id)
            .context("updating address map")?;
        self.address_map = map.flush().context("flushing address map")?;

        Ok(Address::new_id(id))
    }

    /// Resolves an address to its ID address, if a mapping exists. ID
    /// addresses resolve to themselves.
    pub fn resolve_address<BS: BlockStore>(
        &self,
        store: &BS,
        addr: &Address,
    ) -> anyhow::Result<Option<Address>> {
        if addr.protocol() == Protocol::ID {
            return Ok(Some(*addr));
        }

        let map: Hamt<BS, u64> =
            Hamt::load_with_bit_width(&self.address_map, store.clone(), HAMT_BIT_WIDTH)
                .context("loading address map")?;
        Ok(map
            .get(&BytesKey(addr.to_bytes()))
            .context("reading address map")?
            .map(|id| Address::new_id(*id)))
    }
}

impl Cbor for State {}
