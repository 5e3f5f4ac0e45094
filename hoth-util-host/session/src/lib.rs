// Licensed under the Apache-2.0 license

//! Session Management
//!
//! Binds a Hoth device to the command layer and tracks per-session traffic

#![no_std]

use core::fmt;
use hoth_util_host_command_types::{SecurityV2Command, SecurityVersion};
use hoth_util_host_transport::{exec_security_v2_cmd, HothDevice, ResponseSlot, TransportError};
use log::debug;

/// Session error enumeration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Transport layer error
    Transport(TransportError),
}

impl SessionError {
    /// Device status when the device failed, `-1` otherwise
    pub fn status_code(&self) -> i32 {
        match self {
            SessionError::Transport(e) => e.status_code(),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Transport(e) => write!(f, "{}", e),
        }
    }
}

impl From<TransportError> for SessionError {
    fn from(e: TransportError) -> Self {
        SessionError::Transport(e)
    }
}

/// Session result type
pub type SessionResult<T> = Result<T, SessionError>;

/// Trait for session types that can execute commands
/// This allows the API layer to remain transport-agnostic while working with sessions
pub trait CommandSession {
    /// Security protocol generation of the bound device
    fn security_version(&self) -> SecurityVersion;

    /// Execute a SECURITY_V2 command, decoding the reply into `response_slots`
    fn exec_security_v2<'r>(
        &mut self,
        command: &SecurityV2Command,
        request_storage: &mut [u8],
        request_params: &[&[u8]],
        response_storage: &'r mut [u8],
        response_slots: &mut [ResponseSlot<'r>],
    ) -> SessionResult<()>;

    /// Execute a raw host command, returning the response length
    fn hostcmd_exec(
        &mut self,
        command: u16,
        version: u8,
        request: &[u8],
        response: &mut [u8],
    ) -> SessionResult<usize>;
}

/// Session statistics
#[derive(Debug, Clone, Default)]
pub struct SessionStatistics {
    pub commands_sent: u64,
    pub commands_succeeded: u64,
    pub commands_failed: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

/// Device session context using dynamic dispatch with a borrowed device
pub struct HothSession<'d> {
    /// Session ID for tracking
    pub session_id: u32,

    /// Device interface (borrowed)
    pub device: &'d mut dyn HothDevice,

    /// Error state information
    pub last_error: Option<SessionError>,

    /// Statistics
    pub stats: SessionStatistics,
}

impl<'d> HothSession<'d> {
    pub fn new(session_id: u32, device: &'d mut dyn HothDevice) -> Self {
        Self {
            session_id,
            device,
            last_error: None,
            stats: SessionStatistics::default(),
        }
    }

    fn record<T>(&mut self, result: Result<T, TransportError>) -> SessionResult<T> {
        self.stats.commands_sent += 1;
        match result {
            Ok(value) => {
                self.stats.commands_succeeded += 1;
                Ok(value)
            }
            Err(e) => {
                debug!("session {}: command failed: {}", self.session_id, e);
                let e = SessionError::from(e);
                self.stats.commands_failed += 1;
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }
}

impl CommandSession for HothSession<'_> {
    fn security_version(&self) -> SecurityVersion {
        self.device.security_version()
    }

    fn exec_security_v2<'r>(
        &mut self,
        command: &SecurityV2Command,
        request_storage: &mut [u8],
        request_params: &[&[u8]],
        response_storage: &'r mut [u8],
        response_slots: &mut [ResponseSlot<'r>],
    ) -> SessionResult<()> {
        let request_len = request_storage.len();
        let result = exec_security_v2_cmd(
            &mut *self.device,
            command,
            request_storage,
            request_params,
            response_storage,
            response_slots,
        );
        if let Ok(received) = result {
            self.stats.bytes_sent += request_len as u64;
            self.stats.bytes_received += received as u64;
        }
        self.record(result).map(|_| ())
    }

    fn hostcmd_exec(
        &mut self,
        command: u16,
        version: u8,
        request: &[u8],
        response: &mut [u8],
    ) -> SessionResult<usize> {
        let result = self
            .device
            .hostcmd_exec(command, version, request, response);
        if let Ok(received) = result {
            self.stats.bytes_sent += request.len() as u64;
            self.stats.bytes_received += received as u64;
        }
        self.record(result)
    }
}
