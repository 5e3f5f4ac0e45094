// Licensed under the Apache-2.0 license

//! Transport error types

use core::fmt;

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Device returned a non-zero status
    DeviceStatus(i32),

    /// Request storage cannot hold the header or the given parameter
    InsufficientRequestBuffer { param: Option<usize> },

    /// Response ended before the header or the given parameter was complete
    InsufficientResponseBytes { param: Option<usize> },

    /// Device reported more bytes than the response storage holds
    ResponseOverflow { reported: usize, capacity: usize },

    /// Response carries a different number of parameters than requested
    ParamCountMismatch { expected: usize, actual: usize },

    /// Fixed response parameter has an unexpected size
    ParamSizeMismatch {
        param: usize,
        expected: usize,
        actual: usize,
    },

    /// Reserved header field is non-zero
    ReservedNonZero,

    /// Padding after a serialized parameter is non-zero
    NonZeroPadding { param: usize },

    /// Parameter value too large to be framed
    ParamTooLarge { param: usize, size: usize },

    /// Serialized parameter does not fit its output buffer exactly
    OutputSizeMismatch { size: usize, output: usize },
}

impl TransportError {
    /// Status code reported to callers: the device's own code when the device
    /// failed, `-1` for host-side failures
    pub fn status_code(&self) -> i32 {
        match self {
            TransportError::DeviceStatus(status) => *status,
            _ => -1,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::DeviceStatus(status) => write!(f, "Device returned status {}", status),
            TransportError::InsufficientRequestBuffer { param: None } => {
                write!(f, "Insufficient bytes for request header")
            }
            TransportError::InsufficientRequestBuffer { param: Some(i) } => {
                write!(f, "Insufficient bytes for request param {}", i)
            }
            TransportError::InsufficientResponseBytes { param: None } => {
                write!(f, "Insufficient bytes for response header")
            }
            TransportError::InsufficientResponseBytes { param: Some(i) } => {
                write!(f, "Insufficient bytes for response param {}", i)
            }
            TransportError::ResponseOverflow { reported, capacity } => write!(
                f,
                "Device reported {} response bytes, buffer holds {}",
                reported, capacity
            ),
            TransportError::ParamCountMismatch { expected, actual } => write!(
                f,
                "Expected {} response params, got {}",
                expected, actual
            ),
            TransportError::ParamSizeMismatch {
                param,
                expected,
                actual,
            } => write!(
                f,
                "Response param {} has size {}, expected {}",
                param, actual, expected
            ),
            TransportError::ReservedNonZero => write!(f, "Reserved field non-zero"),
            TransportError::NonZeroPadding { param } => {
                write!(f, "Padding of response param {} is non-zero", param)
            }
            TransportError::ParamTooLarge { param, size } => {
                write!(f, "Request param {} is too large ({} bytes)", param, size)
            }
            TransportError::OutputSizeMismatch { size, output } => write!(
                f,
                "Parameter size {} does not match output size {}",
                size, output
            ),
        }
    }
}
