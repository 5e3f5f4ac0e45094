// Licensed under the Apache-2.0 license

//! Security Token Commands
//!
//! Records exchanged by the challenge-authenticated token queries

use crate::SecurityV2Command;
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Largest serialized response accepted for a token query
pub const MAX_TOKEN_RESPONSE_SIZE: usize = 1024;

/// Size of a single token in bytes
pub const TOKEN_BYTE_SIZE: usize = 16;

/// Major command shared by all token queries
pub const HOTH_PRV_CMD_HOTH_SECURITY_V2_TOKENS_MAJOR_COMMAND: u8 = 0x0A;

pub const HOTH_PRV_CMD_HOTH_SECURITY_V2_GET_TOKEN_SET_COUNT_MINOR_COMMAND: u8 = 0x00;
pub const HOTH_PRV_CMD_HOTH_SECURITY_V2_GET_TOKEN_SET_INFO_MINOR_COMMAND: u8 = 0x01;
pub const HOTH_PRV_CMD_HOTH_SECURITY_V2_GET_TOKENS_IN_SET_MINOR_COMMAND: u8 = 0x02;

pub const GET_TOKEN_SET_COUNT: SecurityV2Command = SecurityV2Command::new(
    HOTH_PRV_CMD_HOTH_SECURITY_V2_TOKENS_MAJOR_COMMAND,
    HOTH_PRV_CMD_HOTH_SECURITY_V2_GET_TOKEN_SET_COUNT_MINOR_COMMAND,
);

pub const GET_TOKEN_SET_INFO: SecurityV2Command = SecurityV2Command::new(
    HOTH_PRV_CMD_HOTH_SECURITY_V2_TOKENS_MAJOR_COMMAND,
    HOTH_PRV_CMD_HOTH_SECURITY_V2_GET_TOKEN_SET_INFO_MINOR_COMMAND,
);

pub const GET_TOKENS_IN_SET: SecurityV2Command = SecurityV2Command::new(
    HOTH_PRV_CMD_HOTH_SECURITY_V2_TOKENS_MAJOR_COMMAND,
    HOTH_PRV_CMD_HOTH_SECURITY_V2_GET_TOKENS_IN_SET_MINOR_COMMAND,
);

/// Single-use challenge or boot session value
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoBytes, FromBytes, Immutable)]
pub struct Nonce {
    pub nonce: [u8; 16],
}

/// Identifies the device's current boot session
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoBytes, FromBytes, Immutable)]
pub struct BootNonce {
    pub nonce: Nonce,
}

/// Header covered by a detached challenge-response signature
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable)]
pub struct ChallengeResponseHeader {
    pub signature_version: u32,
    pub signature_purpose: u32,
    pub major_command: u8,
    pub minor_command: u8,
    pub signed_response_length: u16,
    pub hw_cat: u16,
    pub reserved_0: [u8; 2],
    pub hw_id: u64,
    pub verifier_nonce: Nonce,
    pub reserved_1: [u8; 24],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable)]
pub struct EcP256Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
}

/// Signature returned separately from the data it covers
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoBytes, FromBytes, Immutable)]
pub struct DetachedChallengeResponseSignature {
    pub signature_header: ChallengeResponseHeader,
    pub signature: EcP256Signature,
}

/// Token set description, copied byte-for-byte from the device
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoBytes, FromBytes, Immutable)]
pub struct TokenSetInfo {
    pub category: u16,
    pub num_tokens: u16,
    pub is_frozen: u8,
    pub reserved_0: [u8; 3],
}
