// Licensed under the Apache-2.0 license

//! SECURITY_V2 parameter codec
//!
//! Builds request buffers from an ordered list of fields and decomposes the
//! device's reply into response slots. A slot is either [`ResponseSlot::Fixed`],
//! whose size is known up front and which is filled in place, or
//! [`ResponseSlot::Serialized`], whose length is only discovered from the
//! response and which borrows its value from the response storage.

use crate::{HothDevice, TransportError, TransportResult};
use core::mem::size_of;
use hoth_util_host_command_types::{
    padding_size, SecurityV2Command, SecurityV2ParamHeader, SecurityV2RequestHeader,
    SecurityV2ResponseHeader,
};
use log::{debug, error};
use zerocopy::{FromBytes, IntoBytes};

/// A response parameter whose length is carried in the response itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializedParam<'r> {
    /// Length reported by the device
    pub size: u16,
    pub reserved: u16,
    /// Bytes backing the value inside the response storage
    pub value: &'r [u8],
}

impl<'r> SerializedParam<'r> {
    pub fn new(value: &'r [u8]) -> Self {
        Self {
            size: value.len() as u16,
            reserved: 0,
            value,
        }
    }

    /// Reported length of the value
    pub fn size(&self) -> usize {
        self.size as usize
    }

    /// The value, never extending past the backing storage
    pub fn value(&self) -> &'r [u8] {
        let len = core::cmp::min(self.size(), self.value.len());
        &self.value[..len]
    }
}

/// Destination of one response parameter
#[derive(Debug)]
pub enum ResponseSlot<'r> {
    /// Caller-allocated storage sized exactly to the expected record
    Fixed(&'r mut [u8]),
    /// Filled with the parameter after a successful decode, `None` until then
    Serialized(Option<SerializedParam<'r>>),
}

impl<'r> ResponseSlot<'r> {
    pub fn serialized() -> Self {
        ResponseSlot::Serialized(None)
    }

    /// The decoded serialized parameter, if this slot holds one
    pub fn as_serialized(&self) -> Option<&SerializedParam<'r>> {
        match self {
            ResponseSlot::Serialized(param) => param.as_ref(),
            ResponseSlot::Fixed(_) => None,
        }
    }
}

struct ByteWriter<'a> {
    data: &'a mut [u8],
    consumed: usize,
}

impl<'a> ByteWriter<'a> {
    fn new(data: &'a mut [u8]) -> Self {
        Self { data, consumed: 0 }
    }

    // Marks `bytes` as consumed and returns the region they occupy
    fn consume(&mut self, bytes: usize) -> Option<&mut [u8]> {
        let start = self.consumed;
        let end = start.checked_add(bytes)?;
        let region = self.data.get_mut(start..end)?;
        self.consumed = end;
        Some(region)
    }
}

struct ByteReader<'r> {
    data: &'r [u8],
    consumed: usize,
}

impl<'r> ByteReader<'r> {
    fn new(data: &'r [u8]) -> Self {
        Self { data, consumed: 0 }
    }

    fn consume(&mut self, bytes: usize) -> Option<&'r [u8]> {
        let start = self.consumed;
        let end = start.checked_add(bytes)?;
        let region = self.data.get(start..end)?;
        self.consumed = end;
        Some(region)
    }
}

/// Frame `params` behind a request header for `command` into `storage`
///
/// Returns the number of bytes written. Bytes of `storage` past that point are
/// left untouched.
pub fn encode_request(
    storage: &mut [u8],
    command: &SecurityV2Command,
    params: &[&[u8]],
) -> TransportResult<usize> {
    let param_count = u16::try_from(params.len())
        .map_err(|_| TransportError::InsufficientRequestBuffer { param: None })?;
    let header = SecurityV2RequestHeader {
        major_command: command.major,
        minor_command: command.minor,
        param_count,
    };

    let mut writer = ByteWriter::new(storage);
    writer
        .consume(size_of::<SecurityV2RequestHeader>())
        .ok_or(TransportError::InsufficientRequestBuffer { param: None })?
        .copy_from_slice(header.as_bytes());

    for (i, value) in params.iter().enumerate() {
        let size = u16::try_from(value.len()).map_err(|_| TransportError::ParamTooLarge {
            param: i,
            size: value.len(),
        })?;
        let param_header = SecurityV2ParamHeader { size, reserved: 0 };
        writer
            .consume(size_of::<SecurityV2ParamHeader>())
            .ok_or(TransportError::InsufficientRequestBuffer { param: Some(i) })?
            .copy_from_slice(param_header.as_bytes());

        let region = writer
            .consume(value.len() + padding_size(value.len()))
            .ok_or(TransportError::InsufficientRequestBuffer { param: Some(i) })?;
        let (data, padding) = region.split_at_mut(value.len());
        data.copy_from_slice(value);
        padding.fill(0);
    }

    Ok(writer.consumed)
}

/// Decode `response` into `slots`, in order
///
/// With no slots the response is not inspected at all.
pub fn decode_response<'r>(
    response: &'r [u8],
    slots: &mut [ResponseSlot<'r>],
) -> TransportResult<()> {
    if slots.is_empty() {
        return Ok(());
    }

    let mut reader = ByteReader::new(response);
    let header_bytes = reader
        .consume(size_of::<SecurityV2ResponseHeader>())
        .ok_or(TransportError::InsufficientResponseBytes { param: None })?;
    let header = SecurityV2ResponseHeader::read_from_bytes(header_bytes)
        .map_err(|_| TransportError::InsufficientResponseBytes { param: None })?;

    let strict = slots
        .iter()
        .any(|slot| matches!(slot, ResponseSlot::Serialized(_)));
    if strict && header.reserved != 0 {
        return Err(TransportError::ReservedNonZero);
    }

    if header.param_count as usize != slots.len() {
        return Err(TransportError::ParamCountMismatch {
            expected: slots.len(),
            actual: header.param_count as usize,
        });
    }

    for (i, slot) in slots.iter_mut().enumerate() {
        let param_bytes = reader
            .consume(size_of::<SecurityV2ParamHeader>())
            .ok_or(TransportError::InsufficientResponseBytes { param: Some(i) })?;
        let param = SecurityV2ParamHeader::read_from_bytes(param_bytes)
            .map_err(|_| TransportError::InsufficientResponseBytes { param: Some(i) })?;
        let size = param.size as usize;

        match slot {
            // Fixed params are read laxly: reserved fields and padding are not checked
            ResponseSlot::Fixed(dst) => {
                if size != dst.len() {
                    return Err(TransportError::ParamSizeMismatch {
                        param: i,
                        expected: dst.len(),
                        actual: size,
                    });
                }
                let value = reader
                    .consume(size + padding_size(size))
                    .ok_or(TransportError::InsufficientResponseBytes { param: Some(i) })?;
                dst.copy_from_slice(&value[..size]);
            }
            ResponseSlot::Serialized(out) => {
                if param.reserved != 0 {
                    return Err(TransportError::ReservedNonZero);
                }
                let value = reader
                    .consume(size)
                    .ok_or(TransportError::InsufficientResponseBytes { param: Some(i) })?;
                let padding = reader
                    .consume(padding_size(size))
                    .ok_or(TransportError::InsufficientResponseBytes { param: Some(i) })?;
                if padding.iter().any(|b| *b != 0) {
                    return Err(TransportError::NonZeroPadding { param: i });
                }
                *out = Some(SerializedParam {
                    size: param.size,
                    reserved: param.reserved,
                    value,
                });
            }
        }
    }

    Ok(())
}

/// Execute a SECURITY_V2 command with `major.minor` code
///
/// `request_storage` and `response_storage` are the backing buffers for the
/// command; the whole request storage is sent. Serialized slots borrow from
/// `response_storage` once this returns. Returns the number of response bytes
/// the device produced.
pub fn exec_security_v2_cmd<'r>(
    device: &mut dyn HothDevice,
    command: &SecurityV2Command,
    request_storage: &mut [u8],
    request_params: &[&[u8]],
    response_storage: &'r mut [u8],
    response_slots: &mut [ResponseSlot<'r>],
) -> TransportResult<usize> {
    let request_len = encode_request(request_storage, command, request_params).map_err(|e| {
        error!("{}", e);
        e
    })?;
    debug!(
        "SECURITY_V2 {:#04x}.{:#04x}: {} request params, {} of {} request bytes framed",
        command.major,
        command.minor,
        request_params.len(),
        request_len,
        request_storage.len()
    );

    let capacity = response_storage.len();
    // The device logs its own failures; the status is passed through unchanged.
    let bytes_read =
        device.hostcmd_exec(command.base_command, 0, request_storage, response_storage)?;
    if bytes_read > capacity {
        let e = TransportError::ResponseOverflow {
            reported: bytes_read,
            capacity,
        };
        error!("{}", e);
        return Err(e);
    }

    let response: &'r [u8] = response_storage;
    decode_response(&response[..bytes_read], response_slots).map_err(|e| {
        error!("{}", e);
        e
    })?;
    Ok(bytes_read)
}

/// Copy a serialized param into an output buffer of exactly its size
pub fn copy_param(param: &SerializedParam<'_>, output: &mut [u8]) -> TransportResult<()> {
    if param.size() != output.len() || param.value().len() != output.len() {
        let e = TransportError::OutputSizeMismatch {
            size: param.size(),
            output: output.len(),
        };
        error!("{}", e);
        return Err(e);
    }
    output.copy_from_slice(param.value());
    Ok(())
}
