// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use vm::{actor_error, ActorError, TokenAmount};

/// Running gas meter for one invocation chain. `gas_used` can never exceed
/// the available limit: an over-charge saturates the meter and reports out of
/// gas, which keeps the refund arithmetic `gas_limit - gas_used` safe.
pub struct GasTracker {
    gas_available: TokenAmount,
    gas_used: TokenAmount,
}

impl GasTracker {
    pub fn new(gas_available: TokenAmount, gas_used: TokenAmount) -> Self {
        Self {
            gas_available,
            gas_used,
        }
    }

    /// Safely consumes gas and returns an out of gas error if there is not
    /// sufficient enough gas remaining for charge.
    pub fn charge_gas(&mut self, to_use: TokenAmount) -> Result<(), ActorError> {
        let used = &self.gas_used + &to_use;
        if used > self.gas_available {
            self.gas_used = self.gas_available.clone();
            Err(actor_error!(SYS_OUT_OF_GAS;
                "not enough gas (used={}) (available={})", used, self.gas_available))
        } else {
            self.gas_used = used;
            Ok(())
        }
    }

    /// Getter for gas available.
    pub fn gas_available(&self) -> &TokenAmount {
        &self.gas_available
    }

    /// Getter for gas used.
    pub fn gas_used(&self) -> &TokenAmount {
        &self.gas_used
    }
}
