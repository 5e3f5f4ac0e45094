// Licensed under the Apache-2.0 license

//! Challenge nonce generation

use crate::error::{HtoolError, HtoolResult};
use hoth_util_host_command_types::Nonce;
use log::error;

/// Cryptographically secure byte source
pub trait SecureRandom {
    /// Fill all of `dest`, or fail with the source's diagnostic text
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), String>;
}

/// Operating system entropy
#[derive(Debug, Default, Clone, Copy)]
pub struct OsRandom;

impl SecureRandom for OsRandom {
    fn fill(&mut self, dest: &mut [u8]) -> Result<(), String> {
        getrandom::getrandom(dest).map_err(|e| e.to_string())
    }
}

/// Fresh challenge for one round trip
pub fn get_rand_challenge_nonce(rng: &mut dyn SecureRandom) -> HtoolResult<Nonce> {
    let mut challenge = Nonce::default();
    rng.fill(&mut challenge.nonce).map_err(|msg| {
        let e = HtoolError::RandomSource(msg);
        error!("{}", e);
        e
    })?;
    Ok(challenge)
}
