// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use address::Address;
use cid::Cid;
use thiserror::Error;
use vm::{ActorError, MethodNum, TokenAmount};

/// Hard errors of the message application pipeline. Any of these aborts the
/// current message without producing a receipt; soft actor failures travel as
/// receipts with a non-zero exit code instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid message: {0}")]
    InvalidMessage(&'static str),
    #[error("Sender actor {0} not found")]
    SenderNotFound(Address),
    #[error("Actor {0} not found")]
    ActorNotFound(Address),
    #[error("Recipient {0} does not exist and is not an account-key address")]
    RecipientNotCreatable(Address),
    #[error("Actor sequence invalid: {got} != {expected}")]
    BadNonce { expected: u64, got: u64 },
    #[error("Actor balance less than needed: {balance} < {required}")]
    InsufficientFunds {
        balance: TokenAmount,
        required: TokenAmount,
    },
    #[error("Block miner actor {0} not found")]
    MinerNotFound(Address),
    #[error("No method {method} registered for actor code {code}")]
    InvokerMissing { code: Cid, method: MethodNum },
    #[error("Fatal actor error: {0}")]
    Actor(ActorError),
    #[error(transparent)]
    State(#[from] state_tree::Error),
    #[error(transparent)]
    BlockStore(#[from] ipld_blockstore::Error),
    #[error("{0}")]
    Other(String),
}
