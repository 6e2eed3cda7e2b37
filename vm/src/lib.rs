// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod actor_state;
mod cbor;
mod error;
mod exit_code;
mod invoc;
mod method;
mod token;

pub use self::actor_state::*;
pub use self::cbor::*;
pub use self::error::*;
pub use self::exit_code::*;
pub use self::invoc::*;
pub use self::method::*;
pub use self::token::*;

#[macro_use]
extern crate lazy_static;

use cid::{
    multihash::{Code, MultihashDigest},
    Cid,
};
use fvm_ipld_encoding::{to_vec, DAG_CBOR};

/// Height of the block a message is applied in. The genesis block has epoch
/// zero.
pub type ChainEpoch = u64;

lazy_static! {
    /// Cbor bytes of an empty array serialized.
    pub static ref EMPTY_ARR_BYTES: Vec<u8> = to_vec::<[(); 0]>(&[]).unwrap();

    /// Cid of the empty array Cbor bytes (`EMPTY_ARR_BYTES`), used as the
    /// storage head of actors with no state yet.
    pub static ref EMPTY_ARR_CID: Cid =
        Cid::new_v1(DAG_CBOR, Code::Blake2b256.digest(&EMPTY_ARR_BYTES));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_checks() {
        assert_eq!(&*EMPTY_ARR_BYTES, &[128u8]);
        assert_eq!(
            EMPTY_ARR_CID.to_string(),
            "bafy2bzacebc3bt6cedhoyw34drrmjvazhu4oj25er2ebk4u445pzycvq4ta4a"
        );
    }
}
