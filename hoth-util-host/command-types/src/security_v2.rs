// Licensed under the Apache-2.0 license

//! SECURITY_V2 Wire Headers
//!
//! Every request is a header followed by `param_count` parameters. Each
//! parameter is a small header, the value, and zero padding up to the next
//! 32-bit boundary. Responses use the same parameter framing behind their own
//! header.

use core::mem::size_of;
use zerocopy::{FromBytes, Immutable, IntoBytes};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoBytes, FromBytes, Immutable)]
pub struct SecurityV2RequestHeader {
    pub major_command: u8,
    pub minor_command: u8,
    pub param_count: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoBytes, FromBytes, Immutable)]
pub struct SecurityV2ParamHeader {
    /// Number of bytes in the parameter's value, excluding padding
    pub size: u16,
    /// Must be zero; keeps the header 32-bit sized
    pub reserved: u16,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, IntoBytes, FromBytes, Immutable)]
pub struct SecurityV2ResponseHeader {
    pub param_count: u16,
    pub reserved: u16,
}

/// Bytes of framing needed for a request carrying `param_count` parameters
pub const fn request_size(param_count: usize) -> usize {
    size_of::<SecurityV2RequestHeader>() + param_count * size_of::<SecurityV2ParamHeader>()
}

/// Bytes of framing needed for a response carrying `param_count` parameters
pub const fn response_size(param_count: usize) -> usize {
    size_of::<SecurityV2ResponseHeader>() + param_count * size_of::<SecurityV2ParamHeader>()
}

/// Padding that follows a value of `size` bytes
pub const fn padding_size(size: usize) -> usize {
    let align = size % size_of::<u32>();
    if align == 0 {
        0
    } else {
        size_of::<u32>() - align
    }
}
