// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use serde::{Deserialize, Serialize};
use std::fmt;

/// ExitCode defines the exit code from an actor method invocation. Zero is
/// success; any other value is a soft failure that reverts the message's state
/// changes. Codes above the system range are actor-defined.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExitCode(pub u8);

impl ExitCode {
    /// Invocation completed successfully.
    pub const OK: ExitCode = ExitCode(0);
    /// The method number was not registered for the callee's code.
    pub const SYS_INVALID_METHOD: ExitCode = ExitCode(1);
    /// The caller is not permitted to perform the requested operation.
    pub const SYS_FORBIDDEN: ExitCode = ExitCode(2);
    /// Method parameters were missing or malformed.
    pub const SYS_ILLEGAL_ARGUMENT: ExitCode = ExitCode(3);
    /// A referenced blob or actor does not exist.
    pub const SYS_NOT_FOUND: ExitCode = ExitCode(4);
    /// The invocation ran over its gas allowance.
    pub const SYS_OUT_OF_GAS: ExitCode = ExitCode(5);
    /// A value failed to serialize or deserialize.
    pub const SYS_SERIALIZATION: ExitCode = ExitCode(6);
    /// An internal invariant of the callee was violated.
    pub const SYS_INTERNAL: ExitCode = ExitCode(7);

    /// First exit code available to user-defined actor failures.
    pub const FIRST_USER_EXIT_CODE: u8 = 16;

    /// Returns true if the exit code was a success.
    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Returns true if exited with an error code.
    pub fn is_error(self) -> bool {
        !self.is_success()
    }

    /// Returns true if the execution may keep its state changes.
    pub fn allows_state_update(self) -> bool {
        self.is_success()
    }
}

impl From<u8> for ExitCode {
    fn from(v: u8) -> Self {
        ExitCode(v)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
