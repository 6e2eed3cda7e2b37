// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{ExitCode, Serialized};

/// Result of an actor method invocation: the return payload together with the
/// exit code the actor reported.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvocOutput {
    pub exit_code: ExitCode,
    pub return_data: Serialized,
}

impl InvocOutput {
    /// Successful invocation output with a return payload.
    pub fn ok(return_data: Serialized) -> Self {
        Self {
            exit_code: ExitCode::OK,
            return_data,
        }
    }

    /// Successful invocation output with no return payload.
    pub fn empty() -> Self {
        Self::ok(Serialized::default())
    }
}
