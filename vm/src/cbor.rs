// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::{
    multihash::{Code, MultihashDigest},
    Cid,
};
use fvm_ipld_encoding::{de::DeserializeOwned, from_slice, ser::Serialize, to_vec, DAG_CBOR};

/// Marker trait for types that travel as canonical dag-cbor blocks.
pub trait Cbor: Serialize + DeserializeOwned {
    /// Marshalls cbor encodable object into cbor bytes.
    fn marshal_cbor(&self) -> Result<Vec<u8>, fvm_ipld_encoding::Error> {
        to_vec(&self)
    }

    /// Unmarshals cbor encoded bytes to object.
    fn unmarshal_cbor(bz: &[u8]) -> Result<Self, fvm_ipld_encoding::Error>
    where
        Self: Sized,
    {
        from_slice(bz)
    }

    /// Returns the content identifier of the serialized object.
    fn cid(&self) -> Result<Cid, fvm_ipld_encoding::Error> {
        Ok(Cid::new_v1(
            DAG_CBOR,
            Code::Blake2b256.digest(&self.marshal_cbor()?),
        ))
    }
}
