// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use cid::{
    multihash::{Code, MultihashDigest},
    Cid,
};
use fvm_ipld_encoding::IPLD_RAW;

lazy_static! {
    pub static ref SYSTEM_ACTOR_CODE_ID: Cid = make_builtin(b"loam/1/system");
    pub static ref INIT_ACTOR_CODE_ID: Cid = make_builtin(b"loam/1/init");
    pub static ref ACCOUNT_ACTOR_CODE_ID: Cid = make_builtin(b"loam/1/account");
}

fn make_builtin(bz: &[u8]) -> Cid {
    Cid::new_v1(IPLD_RAW, Code::Identity.digest(bz))
}

/// Returns true if the code belongs to a builtin actor.
pub fn is_builtin_actor(code: &Cid) -> bool {
    code == &*SYSTEM_ACTOR_CODE_ID
        || code == &*INIT_ACTOR_CODE_ID
        || code == &*ACCOUNT_ACTOR_CODE_ID
}

/// Returns true if the code belongs to an account actor.
pub fn is_account_actor(code: &Cid) -> bool {
    code == &*ACCOUNT_ACTOR_CODE_ID
}

/// Returns true if the code may exist only as a singleton actor.
pub fn is_singleton_actor(code: &Cid) -> bool {
    code == &*SYSTEM_ACTOR_CODE_ID || code == &*INIT_ACTOR_CODE_ID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_classification() {
        assert!(is_builtin_actor(&ACCOUNT_ACTOR_CODE_ID));
        assert!(is_account_actor(&ACCOUNT_ACTOR_CODE_ID));
        assert!(!is_singleton_actor(&ACCOUNT_ACTOR_CODE_ID));
        assert!(is_singleton_actor(&INIT_ACTOR_CODE_ID));
        assert!(!is_builtin_actor(&Cid::default()));
    }
}
