// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{biguint_ser, TokenAmount};
use cid::Cid;
use fvm_ipld_encoding::tuple::*;

/// State of all actor implementations: the header record stored in the state
/// tree for every ledger entity.
#[derive(PartialEq, Eq, Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct ActorState {
    /// Link to code for the actor.
    pub code: Cid,
    /// Link to the root of the actor's private storage sub-tree.
    pub state: Cid,
    /// Sequence (nonce) of the actor.
    pub sequence: u64,
    /// Tokens available to the actor.
    #[serde(with = "biguint_ser")]
    pub balance: TokenAmount,
}

impl ActorState {
    /// Constructor for actor state
    pub fn new(code: Cid, state: Cid, balance: TokenAmount, sequence: u64) -> Self {
        Self {
            code,
            state,
            sequence,
            balance,
        }
    }

    /// Safely deducts funds from an Actor
    pub fn deduct_funds(&mut self, amt: &TokenAmount) -> Result<(), String> {
        if &self.balance < amt {
            return Err("Not enough funds".to_owned());
        }
        self.balance -= amt;

        Ok(())
    }

    /// Deposits funds to an Actor
    pub fn deposit_funds(&mut self, amt: &TokenAmount) {
        self.balance += amt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EMPTY_ARR_CID;

    #[test]
    fn deduct_and_deposit() {
        let mut act = ActorState::new(Cid::default(), *EMPTY_ARR_CID, 100u64.into(), 0);
        act.deduct_funds(&40u64.into()).unwrap();
        assert_eq!(act.balance, 60u64.into());
        act.deposit_funds(&5u64.into());
        assert_eq!(act.balance, 65u64.into());
        // Overdraw is rejected and leaves the balance untouched.
        assert!(act.deduct_funds(&100u64.into()).is_err());
        assert_eq!(act.balance, 65u64.into());
    }
}
