// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use fvm_ipld_encoding::tuple::*;
use vm::{biguint_ser, ExitCode, Serialized, TokenAmount};

/// Result of a state transition from a message. Field order is the wire
/// order: exit code, return payload, gas consumed.
#[derive(PartialEq, Eq, Clone, Debug, Serialize_tuple, Deserialize_tuple)]
pub struct MessageReceipt {
    pub exit_code: ExitCode,
    pub return_data: Serialized,
    #[serde(with = "biguint_ser")]
    pub gas_used: TokenAmount,
}
