// Licensed under the Apache-2.0 license

//! High-level API functions for Hoth commands
//!
//! Each function resolves its named parameters, stages its outputs, performs
//! one device round trip under the device's security version and commits the
//! validated results. Nothing is written unless every field validated.

pub mod provisioning;
pub mod security_tokens;

pub use hoth_util_host_session::CommandSession;
pub use provisioning::*;
pub use security_tokens::*;

use crate::error::{DecodeError, HtoolError, HtoolResult};
use crate::invocation::Invocation;
use hoth_util_host_session::SessionError;
use log::error;

fn require_device(
    session: Option<&mut dyn CommandSession>,
) -> HtoolResult<&mut dyn CommandSession> {
    session.ok_or_else(|| {
        error!("{}", HtoolError::NoDevice);
        HtoolError::NoDevice
    })
}

fn string_param<'i>(inv: &'i dyn Invocation, name: &str) -> HtoolResult<&'i str> {
    inv.get_param_string(name).map_err(|e| {
        error!("{}", e);
        e.into()
    })
}

fn u32_param(inv: &dyn Invocation, name: &str) -> HtoolResult<u32> {
    inv.get_param_u32(name).map_err(|e| {
        error!("{}", e);
        e.into()
    })
}

fn command_failed(err: SessionError, action: &str) -> HtoolError {
    error!(
        "Unexpected Error: Returned status {}, while trying to send command to {}: {}",
        err.status_code(),
        action,
        err
    );
    err.into()
}

fn reject(err: DecodeError) -> HtoolError {
    error!("{}", err);
    err.into()
}
