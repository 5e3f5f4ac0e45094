// Licensed under the Apache-2.0 license

//! Hoth Command Types
//!
//! Shared command definitions, protocol records and wire headers for the Hoth
//! Utility Host Library

#![no_std]

pub mod provisioning;
pub mod security_tokens;
pub mod security_v2;

// Re-export all types
pub use provisioning::*;
pub use security_tokens::*;
pub use security_v2::*;

/// Base of the Hoth private host command range
pub const HOTH_CMD_BASE: u16 = 0x3E00;

/// Private command carrying SECURITY_V2 requests
pub const HOTH_PRV_CMD_HOTH_SECURITY_V2: u16 = 0x004D;

/// Private command reading and signing the provisioning log
pub const HOTH_PRV_CMD_HOTH_PROVISIONING_LOG: u16 = 0x0049;

/// Offset a private command number into the Hoth host command range
pub const fn hoth_base_cmd(cmd: u16) -> u16 {
    HOTH_CMD_BASE + cmd
}

/// Security protocol generation reported by a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityVersion {
    V2,
    V3,
    Other(u32),
}

impl core::fmt::Display for SecurityVersion {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            SecurityVersion::V2 => write!(f, "SECURITY_V2"),
            SecurityVersion::V3 => write!(f, "SECURITY_V3"),
            SecurityVersion::Other(raw) => write!(f, "SECURITY_UNKNOWN({})", raw),
        }
    }
}

/// A SECURITY_V2 command code: `major.minor` carried inside `base_command`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecurityV2Command {
    pub major: u8,
    pub minor: u8,
    pub base_command: u16,
}

impl SecurityV2Command {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self {
            major,
            minor,
            base_command: hoth_base_cmd(HOTH_PRV_CMD_HOTH_SECURITY_V2),
        }
    }
}
