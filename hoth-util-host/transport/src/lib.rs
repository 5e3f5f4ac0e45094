// Licensed under the Apache-2.0 license

//! Hoth Transport Layer
//!
//! Device abstraction and SECURITY_V2 parameter codec

#![no_std]

pub mod error;
pub mod security_v2;

// Re-export commonly used types
pub use error::{TransportError, TransportResult};
pub use security_v2::{
    copy_param, decode_response, encode_request, exec_security_v2_cmd, ResponseSlot,
    SerializedParam,
};

use hoth_util_host_command_types::SecurityVersion;

/// Low-level host command primitive of a Hoth device
///
/// Implementations own the physical transport. A non-zero device status must
/// be reported as [`TransportError::DeviceStatus`] carrying the code unchanged.
pub trait HothDevice: Send {
    /// Send `request` as host command `command` and fill `response`,
    /// returning the number of response bytes the device produced
    fn hostcmd_exec(
        &mut self,
        command: u16,
        version: u8,
        request: &[u8],
        response: &mut [u8],
    ) -> TransportResult<usize>;

    /// Security protocol generation currently spoken by the device
    fn security_version(&self) -> SecurityVersion;
}
