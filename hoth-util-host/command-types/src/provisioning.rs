// Licensed under the Apache-2.0 license

//! Provisioning Log Commands
//!
//! Records for reading the provisioning log and having the device validate and
//! sign a personalization blob

use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Largest provisioning log the host will accumulate
pub const PROVISIONING_LOG_MAX_SIZE: usize = 2048;

/// Largest log chunk returned by a single read
pub const PROVISIONING_LOG_CHUNK_MAX_SIZE: usize = 1008;

/// Largest signed certificate returned by validate-and-sign
pub const PROVISIONING_CERT_MAX_SIZE: usize = 240;

pub const PROVISIONING_LOG_VERSION: u8 = 1;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisioningLogOp {
    Read = 0,
    ValidateAndSign = 3,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoBytes, FromBytes, Immutable)]
pub struct ProvisioningLogHeader {
    pub version: u8,
    pub reserved: u8,
    /// Size of the log content
    pub size: u16,
    /// CRC32 of `size` bytes of log data
    pub checksum: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoBytes, FromBytes, Immutable)]
pub struct ProvisioningLogRequest {
    pub version: u8,
    pub operation: u8,
    pub reserved: u16,
    /// Chunked read/write offset
    pub offset: u16,
    /// Chunked read/write size
    pub size: u16,
    /// CRC32 of the full provisioning log
    pub checksum: u32,
}

impl ProvisioningLogRequest {
    pub fn new(operation: ProvisioningLogOp) -> Self {
        Self {
            version: PROVISIONING_LOG_VERSION,
            operation: operation as u8,
            ..Default::default()
        }
    }
}

/// One chunk of the provisioning log as returned by a read
#[repr(C)]
#[derive(Debug, Clone, IntoBytes, FromBytes, Immutable)]
pub struct ProvisioningLogChunk {
    pub hdr: ProvisioningLogHeader,
    pub data: [u8; PROVISIONING_LOG_CHUNK_MAX_SIZE],
}
