// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

pub mod account;
mod codes;
pub mod init;
mod singletons;

pub use codes::*;
pub use singletons::*;
