// Licensed under the Apache-2.0 license

//! Security token API functions
//!
//! Challenge-authenticated queries over the device's token sets. Every query
//! binds a fresh challenge nonce into the request; the device answers with the
//! requested data alongside its boot nonce and a detached signature.

use super::{command_failed, reject, require_device, string_param, u32_param};
use crate::error::{DecodeError, HtoolResult};
use crate::invocation::Invocation;
use crate::nonce::{get_rand_challenge_nonce, SecureRandom};
use crate::output::OutputSink;
use crate::version::dispatch;
use hoth_util_host_command_types::{
    request_size, response_size, BootNonce, DetachedChallengeResponseSignature, Nonce,
    TokenSetInfo, GET_TOKENS_IN_SET, GET_TOKEN_SET_COUNT, GET_TOKEN_SET_INFO,
    MAX_TOKEN_RESPONSE_SIZE, TOKEN_BYTE_SIZE,
};
use hoth_util_host_session::CommandSession;
use hoth_util_host_transport::{ResponseSlot, SerializedParam};
use log::debug;
use std::mem::size_of;
use zerocopy::{FromZeros, IntoBytes};

const TOKEN_SET_COUNT_REQUEST_SIZE: usize = request_size(1) + size_of::<Nonce>();
const TOKEN_SET_COUNT_RESPONSE_SIZE: usize = response_size(3)
    + size_of::<u32>()
    + size_of::<BootNonce>()
    + size_of::<DetachedChallengeResponseSignature>();

const TOKEN_SET_INFO_REQUEST_SIZE: usize =
    request_size(2) + size_of::<u32>() + size_of::<Nonce>();
const TOKEN_SET_INFO_RESPONSE_SIZE: usize = response_size(3)
    + size_of::<TokenSetInfo>()
    + size_of::<BootNonce>()
    + size_of::<DetachedChallengeResponseSignature>();

const TOKENS_IN_SET_REQUEST_SIZE: usize =
    request_size(2) + size_of::<u32>() + size_of::<Nonce>();

/// Tokens of one set with the attestation returned alongside them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokensInSet {
    /// Whole tokens, `TOKEN_BYTE_SIZE` bytes each, in device order
    pub tokens: Vec<u8>,
    pub boot_nonce: Vec<u8>,
    pub signature: Vec<u8>,
}

/// Get the number of token sets on the device
///
/// # Parameters
///
/// - `num_ids_output`: destination of the 4-byte native-endian count
/// - `boot_nonce_output`: destination of the boot nonce record
/// - `signature_output`: destination of the detached signature record
pub fn hoth_cmd_get_token_set_count(
    session: Option<&mut dyn CommandSession>,
    inv: &dyn Invocation,
    rng: &mut dyn SecureRandom,
) -> HtoolResult<()> {
    let session = require_device(session)?;
    let num_ids_output = string_param(inv, "num_ids_output")?;
    let boot_nonce_output = string_param(inv, "boot_nonce_output")?;
    let signature_output = string_param(inv, "signature_output")?;

    let sink = OutputSink::open(&[num_ids_output, boot_nonce_output, signature_output])?;
    let challenge = get_rand_challenge_nonce(rng)?;

    let (num_ids, boot_nonce, signature) = dispatch(session, |session| {
        let mut request_storage = [0u8; TOKEN_SET_COUNT_REQUEST_SIZE];
        let mut response_storage = [0u8; TOKEN_SET_COUNT_RESPONSE_SIZE];
        let mut num_ids = 0u32;
        let mut boot_nonce = BootNonce::default();
        let mut signature = DetachedChallengeResponseSignature::new_zeroed();
        let mut slots = [
            ResponseSlot::Fixed(num_ids.as_mut_bytes()),
            ResponseSlot::Fixed(boot_nonce.as_mut_bytes()),
            ResponseSlot::Fixed(signature.as_mut_bytes()),
        ];
        session
            .exec_security_v2(
                &GET_TOKEN_SET_COUNT,
                &mut request_storage,
                &[challenge.as_bytes()],
                &mut response_storage,
                &mut slots,
            )
            .map_err(|e| command_failed(e, "get the Token Set Count"))?;
        Ok((num_ids, boot_nonce, signature))
    })?;

    debug!(
        "token set count {}, boot nonce {}",
        num_ids,
        hex::encode(boot_nonce.as_bytes())
    );
    sink.commit(&[
        num_ids.as_bytes(),
        boot_nonce.as_bytes(),
        signature.as_bytes(),
    ])
}

/// Get the info record of one token set
///
/// # Parameters
///
/// - `set_index`: token set to describe
/// - `token_set_info`: destination of the info record
///
/// The device also returns its boot nonce and a signature for this query. They
/// are decoded but not written anywhere.
pub fn hoth_cmd_get_token_set_info(
    session: Option<&mut dyn CommandSession>,
    inv: &dyn Invocation,
    rng: &mut dyn SecureRandom,
) -> HtoolResult<()> {
    let session = require_device(session)?;
    let set_index = u32_param(inv, "set_index")?;
    let token_set_info = string_param(inv, "token_set_info")?;

    let sink = OutputSink::open(&[token_set_info])?;
    let challenge = get_rand_challenge_nonce(rng)?;

    let info = dispatch(session, |session| {
        let mut request_storage = [0u8; TOKEN_SET_INFO_REQUEST_SIZE];
        let mut response_storage = [0u8; TOKEN_SET_INFO_RESPONSE_SIZE];
        let mut info = TokenSetInfo::default();
        let mut boot_nonce = BootNonce::default();
        let mut signature = DetachedChallengeResponseSignature::new_zeroed();
        let mut slots = [
            ResponseSlot::Fixed(info.as_mut_bytes()),
            ResponseSlot::Fixed(boot_nonce.as_mut_bytes()),
            ResponseSlot::Fixed(signature.as_mut_bytes()),
        ];
        session
            .exec_security_v2(
                &GET_TOKEN_SET_INFO,
                &mut request_storage,
                &[set_index.as_bytes(), challenge.as_bytes()],
                &mut response_storage,
                &mut slots,
            )
            .map_err(|e| command_failed(e, "get the Token Set Info"))?;
        debug!(
            "token set {}: boot nonce {} (not persisted)",
            set_index,
            hex::encode(boot_nonce.as_bytes())
        );
        Ok(info)
    })?;

    sink.commit(&[info.as_bytes()])
}

/// Get the tokens of one token set
///
/// # Parameters
///
/// - `set_index`: token set to read
/// - `token_output`: destination of the token block
/// - `signature_output`: destination of the detached signature
/// - `boot_nonce_output`: destination of the boot nonce
pub fn hoth_cmd_get_tokens_in_set(
    session: Option<&mut dyn CommandSession>,
    inv: &dyn Invocation,
    rng: &mut dyn SecureRandom,
) -> HtoolResult<()> {
    let session = require_device(session)?;
    let token_output = string_param(inv, "token_output")?;
    let signature_output = string_param(inv, "signature_output")?;
    let boot_nonce_output = string_param(inv, "boot_nonce_output")?;
    let set_index = u32_param(inv, "set_index")?;

    let sink = OutputSink::open(&[token_output, boot_nonce_output, signature_output])?;
    let challenge = get_rand_challenge_nonce(rng)?;

    let contents = dispatch(session, |session| {
        get_tokens_in_set_v2(session, set_index, &challenge)
    })?;

    sink.commit(&[
        contents.tokens.as_slice(),
        contents.boot_nonce.as_slice(),
        contents.signature.as_slice(),
    ])
}

fn get_tokens_in_set_v2(
    session: &mut dyn CommandSession,
    set_index: u32,
    challenge: &Nonce,
) -> HtoolResult<TokensInSet> {
    let mut request_storage = [0u8; TOKENS_IN_SET_REQUEST_SIZE];
    let mut response_storage = [0u8; MAX_TOKEN_RESPONSE_SIZE];
    let capacity = response_storage.len();
    let mut slots = [
        ResponseSlot::serialized(),
        ResponseSlot::serialized(),
        ResponseSlot::serialized(),
    ];
    session
        .exec_security_v2(
            &GET_TOKENS_IN_SET,
            &mut request_storage,
            &[set_index.as_bytes(), challenge.as_bytes()],
            &mut response_storage,
            &mut slots,
        )
        .map_err(|e| {
            command_failed(e, &format!("get the Tokens for Set: {}", set_index))
        })?;

    let tokens = required(&slots[0], "tokens")?;
    if tokens.size() > capacity {
        return Err(reject(DecodeError::ExceedsBuffer {
            size: tokens.size(),
            capacity,
        }));
    }
    if tokens.size() % TOKEN_BYTE_SIZE != 0 {
        return Err(reject(DecodeError::NotTokenMultiple {
            size: tokens.size(),
            unit: TOKEN_BYTE_SIZE,
        }));
    }
    let boot_nonce = required(&slots[1], "boot nonce")?;
    let signature = required(&slots[2], "signature")?;

    debug!(
        "set {}: {} tokens",
        set_index,
        tokens.size() / TOKEN_BYTE_SIZE
    );
    Ok(TokensInSet {
        tokens: tokens.value().to_vec(),
        boot_nonce: boot_nonce.value().to_vec(),
        signature: signature.value().to_vec(),
    })
}

fn required<'s, 'r>(
    slot: &'s ResponseSlot<'r>,
    field: &'static str,
) -> HtoolResult<&'s SerializedParam<'r>> {
    slot.as_serialized()
        .ok_or_else(|| reject(DecodeError::MissingField(field)))
}
