// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod message_receipt;
mod unsigned_message;

pub use message_receipt::MessageReceipt;
pub use unsigned_message::UnsignedMessage;

use address::Address;
use num_bigint::BigUint;
use vm::{MethodNum, Serialized, TokenAmount};

/// Message interface to interact with a sent state transition message.
pub trait Message {
    /// Returns the sender of the message.
    fn from(&self) -> &Address;
    /// Returns the destination address of the message.
    fn to(&self) -> &Address;
    /// Returns the message sequence or nonce.
    fn sequence(&self) -> u64;
    /// Returns the amount sent in the message.
    fn value(&self) -> &TokenAmount;
    /// Returns the method number to be called.
    fn method_num(&self) -> MethodNum;
    /// Returns the encoded parameters for the method call.
    fn params(&self) -> &Serialized;
    /// Returns the gas price for the message.
    fn gas_price(&self) -> &BigUint;
    /// Returns the gas limit for the message.
    fn gas_limit(&self) -> &BigUint;
}
