// Licensed under the Apache-2.0 license

//! Security protocol version dispatch

use crate::error::{HtoolError, HtoolResult};
use hoth_util_host_command_types::SecurityVersion;
use hoth_util_host_session::CommandSession;
use log::error;

/// Run `v2` when the device speaks SECURITY_V2, fail otherwise
///
/// The version is read from the session on every call. Nothing is attempted
/// against the device for an unsupported version.
pub fn dispatch<T>(
    session: &mut dyn CommandSession,
    v2: impl FnOnce(&mut dyn CommandSession) -> HtoolResult<T>,
) -> HtoolResult<T> {
    match session.security_version() {
        SecurityVersion::V2 => v2(session),
        version @ (SecurityVersion::V3 | SecurityVersion::Other(_)) => {
            let e = HtoolError::UnsupportedVersion(version);
            error!("{}", e);
            Err(e)
        }
    }
}
