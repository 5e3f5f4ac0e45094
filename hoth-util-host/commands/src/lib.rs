// Licensed under the Apache-2.0 license

//! Hoth Commands Layer
//!
//! Challenge-authenticated device queries, the output staging they commit
//! through, and the command table that exposes them

// Re-export command types for convenience
pub use hoth_util_host_command_types::*;

pub mod api;
pub mod error;
pub mod invocation;
pub mod nonce;
pub mod output;
pub mod registry;
pub mod version;

pub use error::{DecodeError, HtoolError, HtoolResult, ParamError};
pub use invocation::{Invocation, ParamMap};
pub use nonce::{get_rand_challenge_nonce, OsRandom, SecureRandom};
pub use output::OutputSink;
pub use registry::{
    clap_command, find_command, run_command, HtoolCommand, HtoolParam, HTOOL_COMMANDS,
};
pub use version::dispatch;
