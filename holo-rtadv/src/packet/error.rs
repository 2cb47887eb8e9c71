//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

// Type aliases.
pub type DecodeResult<T> = Result<T, DecodeError>;

// Neighbor Discovery decode errors.
#[derive(Clone, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub enum DecodeError {
    IncompletePacket,
    UnknownMessageType(u8),
    InvalidCode(u8),
    InvalidOptionLength(u8, u8),
    DuplicateOption(u8),
    InvalidPrefixLength(u8),
    InvalidDomainName,
}

// ===== impl DecodeError =====

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::IncompletePacket => {
                write!(f, "incomplete packet")
            }
            DecodeError::UnknownMessageType(msg_type) => {
                write!(f, "unknown message type: {msg_type}")
            }
            DecodeError::InvalidCode(code) => {
                write!(f, "invalid code: {code}")
            }
            DecodeError::InvalidOptionLength(opt_type, opt_len) => {
                write!(f, "invalid length {opt_len} for option {opt_type}")
            }
            DecodeError::DuplicateOption(opt_type) => {
                write!(f, "duplicate option: {opt_type}")
            }
            DecodeError::InvalidPrefixLength(plen) => {
                write!(f, "invalid prefix length: {plen}")
            }
            DecodeError::InvalidDomainName => {
                write!(f, "invalid domain name")
            }
        }
    }
}

impl std::error::Error for DecodeError {}
