// Licensed under the Apache-2.0 license

use hoth_util_host_command_types::SecurityVersion;
use hoth_util_host_session::SessionError;
use hoth_util_host_transport::TransportError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// A named invocation parameter could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParamError {
    #[error("Missing required parameter '{0}'")]
    Missing(String),

    #[error("Parameter '{name}' has malformed value '{value}'")]
    Malformed { name: String, value: String },
}

/// A response round-tripped but its contents failed shape validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Failed to parse {0} from response")]
    MissingField(&'static str),

    #[error("Returned token buffer ({size} bytes) is not a multiple of token size ({unit})")]
    NotTokenMultiple { size: usize, unit: usize },

    #[error("Returned token buffer ({size} bytes) is larger than the provided buffer ({capacity})")]
    ExceedsBuffer { size: usize, capacity: usize },

    #[error("Unexpected {field} size. Expecting {expected}; Got {actual}")]
    UnexpectedSize {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Bytes returned: {size} > provisioning log max size: {max}")]
    LogTooLarge { size: usize, max: usize },

    #[error("Bytes returned: {size} > provisioning cert max size: {max}")]
    ResponseTooLarge { size: usize, max: usize },
}

/// Errors surfaced by the query operations
#[derive(Error, Debug)]
pub enum HtoolError {
    #[error("Unable to retrieve hoth device")]
    NoDevice,

    #[error(transparent)]
    Parameter(#[from] ParamError),

    #[error("Error: {source}, when attempting to open file: {}", .path.display())]
    Resource { path: PathBuf, source: io::Error },

    #[error("Error: {0} returned trying to generate random bytes for challenge nonce")]
    RandomSource(String),

    #[error("{0} not supported yet")]
    UnsupportedVersion(SecurityVersion),

    #[error("Device returned status {0}")]
    DeviceCommand(i32),

    #[error("Transport error: {0}")]
    Transport(TransportError),

    #[error(transparent)]
    DecodeValidation(#[from] DecodeError),

    #[error("Error: {source}, when writing file: {}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl HtoolError {
    /// Status returned to the caller: the device's own status when the device
    /// failed the command, `-1` for everything else
    pub fn status_code(&self) -> i32 {
        match self {
            HtoolError::DeviceCommand(status) => *status,
            _ => -1,
        }
    }
}

impl From<TransportError> for HtoolError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::DeviceStatus(status) => HtoolError::DeviceCommand(status),
            other => HtoolError::Transport(other),
        }
    }
}

impl From<SessionError> for HtoolError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Transport(e) => e.into(),
        }
    }
}

pub type HtoolResult<T> = Result<T, HtoolError>;
