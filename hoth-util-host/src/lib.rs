// Licensed under the Apache-2.0 license

//! Hoth Utility Host Library
//!
//! Challenge-authenticated security token queries and provisioning log access
//! for Hoth devices speaking the SECURITY_V2 protocol.
//!
//! - **command-types**: protocol records, command codes and wire headers with zerocopy support
//! - **transport**: the `HothDevice` host command primitive and the SECURITY_V2 parameter codec
//! - **session**: binds one device to the command layer
//! - **commands**: query operations, output staging and the command table
//!
//! ## Architecture Overview
//!
//! ```text
//!     ┌─────────────────┐    ┌─────────────────┐
//!     │ hoth-           │    │ hoth-           │
//!     │ commands        │    │ command-types   │
//!     │ (High-level API)│    │ (Type Defs)     │
//!     └─────────────────┘    └─────────────────┘
//!              │                       │
//!              └───────────────────────┘
//!                          │
//!             ┌──────────────────┐
//!             │ hoth-            │
//!             │ session          │
//!             └──────────────────┘
//!                      │
//!             ┌──────────────────┐         ┌─────────────────┐
//!             │ hoth-            │◄────────│ HothDevice      │
//!             │ transport        │         │ (USB, SPI, ...) │
//!             │ (SECURITY_V2)    │         └─────────────────┘
//!             └──────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hoth_util_host::{hoth_cmd_get_token_set_count, HothSession, OsRandom, ParamMap};
//!
//! struct UsbHoth { /* ... */ }
//! impl HothDevice for UsbHoth { /* ... */ }
//!
//! let mut device = UsbHoth::open()?;
//! let mut session = HothSession::new(1, &mut device);
//! let inv = ParamMap::from_pairs([
//!     ("num_ids_output", "num_ids.bin"),
//!     ("boot_nonce_output", "boot_nonce.bin"),
//!     ("signature_output", "signature.bin"),
//! ]);
//! hoth_cmd_get_token_set_count(Some(&mut session), &inv, &mut OsRandom)?;
//! ```

// Re-export main public APIs for convenience
pub use hoth_util_host_command_types::{
    BootNonce, DetachedChallengeResponseSignature, Nonce, SecurityVersion, TokenSetInfo,
    TOKEN_BYTE_SIZE,
};
pub use hoth_util_host_commands::api::{
    hoth_cmd_get_provisioning_log, hoth_cmd_get_token_set_count, hoth_cmd_get_token_set_info,
    hoth_cmd_get_tokens_in_set, hoth_cmd_validate_and_sign,
};
pub use hoth_util_host_commands::{
    find_command, run_command, Invocation, OsRandom, ParamMap, SecureRandom, HTOOL_COMMANDS,
};
pub use hoth_util_host_session::{CommandSession, HothSession};
pub use hoth_util_host_transport::HothDevice;

// Re-export error types
pub use hoth_util_host_commands::{DecodeError, HtoolError, ParamError};
pub use hoth_util_host_session::SessionError;
pub use hoth_util_host_transport::TransportError;
