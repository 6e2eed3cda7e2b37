// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::{BlockStore, CancelToken, Error};
use anyhow::anyhow;
use cid::Cid;
use db::{Error as DbError, Store};
use fvm_ipld_blockstore::Blockstore;
use fvm_ipld_encoding::DAG_CBOR;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Read;
use std::rc::Rc;

const IDENTITY_HASH: u64 = 0x0;

/// Wrapper around a `BlockStore` which captures every write performed during a
/// VM session and publishes the reachable subset as a batch on flush. Reads see
/// the union of the overlay and the base store; the `Store` impl exposes the
/// durable-only view. This type is not threadsafe and can only be used in
/// synchronous contexts.
#[derive(Debug)]
pub struct BufferedBlockStore<BS> {
    base: BS,
    write: Rc<RefCell<HashMap<Cid, Vec<u8>>>>,
}

impl<BS> Clone for BufferedBlockStore<BS>
where
    BS: Clone,
{
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            write: Rc::clone(&self.write),
        }
    }
}

impl<BS> BufferedBlockStore<BS>
where
    BS: BlockStore,
{
    pub fn new(base: BS) -> Self {
        Self {
            base,
            write: Default::default(),
        }
    }

    /// The durable store underneath the overlay.
    pub fn base(&self) -> &BS {
        &self.base
    }

    /// Flushes the buffered cache based on the root node.
    /// This will recursively traverse the cache and write all data connected by
    /// links to this root Cid into the base store, children before parents, so
    /// a partial failure never leaves a published root with unresolvable
    /// children. Blocks the base store already holds are skipped along with
    /// their entire subtree.
    pub fn flush(&self, root: &Cid, cancel: &CancelToken) -> Result<(), Error> {
        write_recursive(&self.base, &self.write.borrow(), root, cancel)?;

        self.write.borrow_mut().clear();
        Ok(())
    }
}

/// Recursively traverses the cache through Cid links, copying post-order.
fn write_recursive<BS>(
    base: &BS,
    cache: &HashMap<Cid, Vec<u8>>,
    cid: &Cid,
    cancel: &CancelToken,
) -> Result<(), Error>
where
    BS: BlockStore,
{
    // An identity Cid carries its payload inline and is never stored, but the
    // payload may still link to blocks that need to land in the base store.
    if cid.hash().code() == IDENTITY_HASH {
        if cid.codec() == DAG_CBOR {
            for link in block_links(cid.hash().digest(), cid)? {
                write_recursive(base, cache, &link, cancel)?;
            }
        }
        return Ok(());
    }

    // Only dag-cbor blocks participate in the state graph.
    if cid.codec() != DAG_CBOR {
        return Ok(());
    }

    // Content-addressed equality: a block already present in the base store
    // has its whole subtree present, skip recursing through it.
    if base.has(cid)? {
        return Ok(());
    }

    let block = cache.get(cid).ok_or(Error::MissingLink(*cid))?;

    for link in block_links(block, cid)? {
        write_recursive(base, cache, &link, cancel)?;
    }

    if cancel.is_cancelled() {
        return Err(Error::Interrupted);
    }

    base.put_keyed(cid, block)?;
    Ok(())
}

/// Collects every Cid linked from a dag-cbor block without fully decoding it.
fn block_links(block: &[u8], cid: &Cid) -> Result<Vec<Cid>, Error> {
    let mut links = Vec::new();
    scan_for_links(block, &mut links).map_err(|e| Error::InvalidBlock {
        cid: *cid,
        reason: e.to_string(),
    })?;
    Ok(links)
}

/// Reads one CBOR item header and returns the major type along with its
/// argument value (RFC 8949 §3).
fn read_cbor_header<B: Read>(br: &mut B) -> anyhow::Result<(u8, u64)> {
    fn read_fixed<const N: usize>(r: &mut impl Read) -> std::io::Result<[u8; N]> {
        let mut buf = [0; N];
        r.read_exact(&mut buf).map(|_| buf)
    }

    let first = read_fixed::<1>(br)?[0];
    let maj = (first & 0xe0) >> 5;
    let low = first & 0x1f;

    let val = match low {
        ..=23 => low.into(),
        24 => read_fixed::<1>(br)?[0].into(),
        25 => u16::from_be_bytes(read_fixed(br)?).into(),
        26 => u32::from_be_bytes(read_fixed(br)?).into(),
        27 => u64::from_be_bytes(read_fixed(br)?),
        _ => return Err(anyhow!("invalid cbor header")),
    };
    Ok((maj, val))
}

/// Walks a serialized dag-cbor block and pushes every tag-42 link it contains.
/// Scanning the raw bytes avoids deserializing the whole payload into a
/// dynamic value just to find the links.
fn scan_for_links(mut buf: &[u8], out: &mut Vec<Cid>) -> anyhow::Result<()> {
    let mut remaining = 1u64;
    while remaining > 0 {
        let (maj, extra) = read_cbor_header(&mut buf)?;
        match maj {
            // unsigned int, negative int, simple values and floats carry no links
            0 | 1 | 7 => {}
            // byte string, text string
            2 | 3 => {
                if extra > buf.len() as u64 {
                    return Err(anyhow!("unexpected end of cbor stream"));
                }
                buf = &buf[extra as usize..];
            }
            // tag
            6 => {
                if extra == 42 {
                    let (maj, extra) = read_cbor_header(&mut buf)?;
                    // The link is a byte string with a multibase prefix.
                    if maj != 2 {
                        return Err(anyhow!("cbor link is not a byte string"));
                    }
                    if extra > buf.len() as u64 {
                        return Err(anyhow!("unexpected end of cbor stream"));
                    }
                    if buf.first() != Some(&0u8) {
                        return Err(anyhow!("cbor link does not start with a 0x00 byte"));
                    }
                    let link_buf;
                    (link_buf, buf) = buf.split_at(extra as usize);
                    out.push(Cid::try_from(&link_buf[1..])?);
                } else {
                    remaining += 1;
                }
            }
            // array
            4 => {
                remaining += extra;
            }
            // map
            5 => {
                remaining += extra * 2;
            }
            8.. => {
                return Err(anyhow!("invalid cbor major type: {}", maj));
            }
        }
        remaining -= 1;
    }
    Ok(())
}

impl<BS> Blockstore for BufferedBlockStore<BS>
where
    BS: BlockStore,
{
    fn get(&self, cid: &Cid) -> anyhow::Result<Option<Vec<u8>>> {
        if let Some(data) = self.write.borrow().get(cid) {
            return Ok(Some(data.clone()));
        }

        self.base.get(cid)
    }

    fn put_keyed(&self, cid: &Cid, buf: &[u8]) -> anyhow::Result<()> {
        self.write.borrow_mut().insert(*cid, buf.to_vec());
        Ok(())
    }

    fn has(&self, cid: &Cid) -> anyhow::Result<bool> {
        if self.write.borrow().contains_key(cid) {
            return Ok(true);
        }
        self.base.has(cid)
    }
}

impl<BS> Store for BufferedBlockStore<BS>
where
    BS: Store,
{
    fn read<K>(&self, key: K) -> Result<Option<Vec<u8>>, DbError>
    where
        K: AsRef<[u8]>,
    {
        self.base.read(key)
    }

    fn write<K, V>(&self, key: K, value: V) -> Result<(), DbError>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        self.base.write(key, value)
    }

    fn delete<K>(&self, key: K) -> Result<(), DbError>
    where
        K: AsRef<[u8]>,
    {
        self.base.delete(key)
    }

    fn exists<K>(&self, key: K) -> Result<bool, DbError>
    where
        K: AsRef<[u8]>,
    {
        self.base.exists(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BlockStoreExt;
    use cid::multihash::{Code, Multihash};
    use db::MemoryDB;
    use fvm_ipld_encoding::CBOR;
    use serde::{Deserialize, Serialize};

    #[test]
    fn basic_buffered_store() {
        let mem = MemoryDB::default();
        let buf_store = BufferedBlockStore::new(mem.clone());

        let cid = buf_store.put_obj(&8u8, Code::Blake2b256).unwrap();
        assert_eq!(mem.get_obj::<u8>(&cid).unwrap(), None);
        assert_eq!(buf_store.get_obj::<u8>(&cid).unwrap(), Some(8));

        buf_store.flush(&cid, &CancelToken::new()).unwrap();
        assert_eq!(buf_store.get_obj::<u8>(&cid).unwrap(), Some(8));
        assert_eq!(mem.get_obj::<u8>(&cid).unwrap(), Some(8));
        assert!(buf_store.write.borrow().is_empty());
    }

    #[test]
    fn buffered_store_with_links() {
        let mem = MemoryDB::default();
        let buf_store = BufferedBlockStore::new(mem.clone());
        let str_val = String::from("value");
        let value = 8u8;
        let arr_cid = buf_store
            .put_obj(&(str_val.clone(), value), Code::Blake2b256)
            .unwrap();
        let identity_cid = Cid::new_v1(CBOR, Multihash::wrap(0, &[0]).unwrap());

        #[derive(Deserialize, Serialize, PartialEq, Eq, Debug)]
        struct TestObject {
            array: Cid,
            identity: Cid,
            value: String,
        }
        let obj = TestObject {
            array: arr_cid,
            identity: identity_cid,
            value: str_val.clone(),
        };
        let obj_cid = buf_store.put_obj(&obj, Code::Blake2b256).unwrap();

        let root_cid = buf_store.put_obj(&(obj_cid, 1u8), Code::Blake2b256).unwrap();

        // Make sure a block not connected to the root does not get written
        let unconnected = buf_store.put_obj(&27u8, Code::Blake2b256).unwrap();

        assert_eq!(mem.get_obj::<TestObject>(&obj_cid).unwrap(), None);
        assert_eq!(mem.get_obj::<(Cid, u8)>(&root_cid).unwrap(), None);
        assert_eq!(mem.get_obj::<(String, u8)>(&arr_cid).unwrap(), None);
        assert_eq!(buf_store.get_obj::<u8>(&unconnected).unwrap(), Some(27u8));

        // Flush and assert changes
        buf_store.flush(&root_cid, &CancelToken::new()).unwrap();
        assert_eq!(
            mem.get_obj::<(String, u8)>(&arr_cid).unwrap(),
            Some((str_val, value))
        );
        assert_eq!(mem.get_obj::<TestObject>(&obj_cid).unwrap(), Some(obj));
        assert_eq!(
            mem.get_obj::<(Cid, u8)>(&root_cid).unwrap(),
            Some((obj_cid, 1)),
        );
        // Identity blocks are never written to the base store.
        assert_eq!(mem.get(&identity_cid).unwrap(), None);
        // The unconnected block was dropped with the rest of the overlay.
        assert_eq!(mem.get_obj::<u8>(&unconnected).unwrap(), None);
        assert_eq!(buf_store.get_obj::<u8>(&unconnected).unwrap(), None);
    }

    #[test]
    fn flush_skips_subtrees_already_in_base() {
        let mem = MemoryDB::default();
        let buf_store = BufferedBlockStore::new(mem.clone());

        let leaf_cid = buf_store.put_obj(&"leaf", Code::Blake2b256).unwrap();
        let root_cid = buf_store.put_obj(&(leaf_cid, 0u8), Code::Blake2b256).unwrap();
        buf_store.flush(&root_cid, &CancelToken::new()).unwrap();

        // Flushing the same root again is a no-op: the root is already durable.
        let root_again = buf_store.put_obj(&(leaf_cid, 0u8), Code::Blake2b256).unwrap();
        assert_eq!(root_cid, root_again);
        buf_store.flush(&root_again, &CancelToken::new()).unwrap();
        assert_eq!(mem.get_obj::<(Cid, u8)>(&root_cid).unwrap(), Some((leaf_cid, 0)));
    }

    #[test]
    fn cancelled_flush_publishes_nothing_new() {
        let mem = MemoryDB::default();
        let buf_store = BufferedBlockStore::new(mem.clone());

        let cid = buf_store.put_obj(&1u8, Code::Blake2b256).unwrap();
        let cancel = CancelToken::new();
        cancel.cancel();

        match buf_store.flush(&cid, &cancel) {
            Err(Error::Interrupted) => {}
            other => panic!("expected interrupted flush, got {:?}", other.err()),
        }
        assert_eq!(mem.get_obj::<u8>(&cid).unwrap(), None);
        // The overlay still holds the staged block for a later retry.
        assert_eq!(buf_store.get_obj::<u8>(&cid).unwrap(), Some(1));
    }
}
