// Copyright 2020 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

/// Address error
#[derive(Debug, PartialEq, Eq, Error)]
pub enum Error {
    #[error("Unknown address protocol")]
    UnknownProtocol,
    #[error("Invalid address payload")]
    InvalidPayload,
    #[error("Invalid address length")]
    InvalidLength,
    #[error("Invalid address checksum")]
    InvalidChecksum,
    #[error("Invalid address network prefix")]
    InvalidPrefix,
    #[error("Cannot get id from non id address")]
    NonIDAddress,
    #[error("Invalid base32 encoding: {0}")]
    Base32Decoding(String),
}
