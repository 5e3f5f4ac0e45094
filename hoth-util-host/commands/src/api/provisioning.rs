// Licensed under the Apache-2.0 license

//! Provisioning log API functions
//!
//! The provisioning log is read through a raw host command, in chunks of at
//! most `PROVISIONING_LOG_CHUNK_MAX_SIZE` bytes. The same command asks the
//! device to validate and sign a personalization blob.

use super::{command_failed, reject, require_device, string_param};
use crate::error::{DecodeError, HtoolError, HtoolResult};
use crate::invocation::Invocation;
use crate::output::OutputSink;
use crate::version::dispatch;
use hoth_util_host_command_types::{
    hoth_base_cmd, ProvisioningLogChunk, ProvisioningLogHeader, ProvisioningLogOp,
    ProvisioningLogRequest, HOTH_PRV_CMD_HOTH_PROVISIONING_LOG, PROVISIONING_CERT_MAX_SIZE,
    PROVISIONING_LOG_CHUNK_MAX_SIZE, PROVISIONING_LOG_MAX_SIZE,
};
use hoth_util_host_session::CommandSession;
use log::{debug, error};
use std::io;
use std::mem::size_of;
use std::path::PathBuf;
use zerocopy::{FromZeros, IntoBytes};

const PROVISIONING_LOG_CMD: u16 = hoth_base_cmd(HOTH_PRV_CMD_HOTH_PROVISIONING_LOG);

/// Read the complete provisioning log into `output`
pub fn hoth_cmd_get_provisioning_log(
    session: Option<&mut dyn CommandSession>,
    inv: &dyn Invocation,
) -> HtoolResult<()> {
    let session = require_device(session)?;
    let output = string_param(inv, "output")?;

    let sink = OutputSink::open(&[output])?;
    let log = dispatch(session, read_provisioning_log)?;
    sink.commit(&[log.as_slice()])
}

/// Read the provisioning log from a SECURITY_V2 device
pub fn read_provisioning_log(session: &mut dyn CommandSession) -> HtoolResult<Vec<u8>> {
    let mut request = ProvisioningLogRequest::new(ProvisioningLogOp::Read);
    let mut header = ProvisioningLogHeader::default();
    session
        .hostcmd_exec(
            PROVISIONING_LOG_CMD,
            0,
            request.as_bytes(),
            header.as_mut_bytes(),
        )
        .map_err(|e| command_failed(e, "read the provisioning log header"))?;

    let total = header.size as usize;
    if total > PROVISIONING_LOG_MAX_SIZE {
        return Err(reject(DecodeError::LogTooLarge {
            size: total,
            max: PROVISIONING_LOG_MAX_SIZE,
        }));
    }
    debug!(
        "provisioning log: version {}, {} bytes, checksum {:#010x}",
        header.version, total, header.checksum
    );

    let mut log = Vec::with_capacity(total);
    while log.len() < total {
        let chunk_size = (total - log.len()).min(PROVISIONING_LOG_CHUNK_MAX_SIZE);
        request.offset = log.len() as u16;
        request.size = chunk_size as u16;

        let mut chunk = ProvisioningLogChunk::new_zeroed();
        let received = session
            .hostcmd_exec(
                PROVISIONING_LOG_CMD,
                0,
                request.as_bytes(),
                chunk.as_mut_bytes(),
            )
            .map_err(|e| command_failed(e, "read the provisioning log"))?;

        let expected = chunk_size + size_of::<ProvisioningLogHeader>();
        if received != expected {
            return Err(reject(DecodeError::UnexpectedSize {
                field: "host command response",
                expected,
                actual: received,
            }));
        }
        log.extend_from_slice(&chunk.data[..chunk_size]);
    }
    Ok(log)
}

/// Have the device validate and sign the personalization blob `perso_blob`,
/// writing the signed result to `output`
pub fn hoth_cmd_validate_and_sign(
    session: Option<&mut dyn CommandSession>,
    inv: &dyn Invocation,
) -> HtoolResult<()> {
    let session = require_device(session)?;
    let perso_blob = string_param(inv, "perso_blob")?;
    let output = string_param(inv, "output")?;

    let blob = read_perso_blob(perso_blob)?;
    let sink = OutputSink::open(&[output])?;
    let signed = dispatch(session, |session| validate_and_sign(session, &blob))?;
    sink.commit(&[signed.as_slice()])
}

/// Send a validate-and-sign request covering `blob`, returning the signed reply
pub fn validate_and_sign(session: &mut dyn CommandSession, blob: &[u8]) -> HtoolResult<Vec<u8>> {
    let mut request = ProvisioningLogRequest::new(ProvisioningLogOp::ValidateAndSign);
    request.size = u16::try_from(blob.len()).map_err(|_| {
        reject(DecodeError::UnexpectedSize {
            field: "perso blob",
            expected: u16::MAX as usize,
            actual: blob.len(),
        })
    })?;
    request.checksum = crc32fast::hash(blob);

    let mut response = [0u8; PROVISIONING_CERT_MAX_SIZE];
    let received = session
        .hostcmd_exec(PROVISIONING_LOG_CMD, 0, request.as_bytes(), &mut response)
        .map_err(|e| command_failed(e, "validate and sign the provisioning log"))?;
    if received > PROVISIONING_CERT_MAX_SIZE {
        return Err(reject(DecodeError::ResponseTooLarge {
            size: received,
            max: PROVISIONING_CERT_MAX_SIZE,
        }));
    }
    debug!("signed perso blob: {} bytes", received);
    Ok(response[..received].to_vec())
}

fn read_perso_blob(path: &str) -> HtoolResult<Vec<u8>> {
    let resource_error = |source: io::Error| {
        let e = HtoolError::Resource {
            path: PathBuf::from(path),
            source,
        };
        error!("{}", e);
        e
    };
    let blob = std::fs::read(path).map_err(resource_error)?;
    if blob.is_empty() {
        return Err(resource_error(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "perso blob is empty",
        )));
    }
    Ok(blob)
}
