// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

mod errors;
mod gas_tracker;
mod invoker;
mod vm;
mod vm_context;

pub use self::errors::Error;
pub use self::gas_tracker::GasTracker;
pub use self::invoker::{Invoker, MethodFn};
pub use self::vm::{try_create_account_actor, VM};
pub use self::vm_context::{StorageHandle, VMContext};
