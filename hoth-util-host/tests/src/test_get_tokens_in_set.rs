// Licensed under the Apache-2.0 license

//! Integration tests for the tokens-in-set query

use crate::common::*;
use hoth_util_host_command_types::{
    BootNonce, DetachedChallengeResponseSignature, GET_TOKENS_IN_SET, MAX_TOKEN_RESPONSE_SIZE,
    TOKEN_BYTE_SIZE,
};
use hoth_util_host_commands::api::hoth_cmd_get_tokens_in_set;
use hoth_util_host_commands::{DecodeError, HtoolError, ParamError, ParamMap};
use hoth_util_host_session::HothSession;
use std::fs;
use std::mem::size_of;

const BOOT_NONCE: [u8; size_of::<BootNonce>()] = [0xBB; size_of::<BootNonce>()];
const SIGNATURE: [u8; size_of::<DetachedChallengeResponseSignature>()] =
    [0xCC; size_of::<DetachedChallengeResponseSignature>()];

fn params(dir: &OutputDir) -> ParamMap {
    ParamMap::from_pairs([
        ("set_index", "5".to_string()),
        ("token_output", path_str(&dir.file("tokens.bin"))),
        ("signature_output", path_str(&dir.file("signature.bin"))),
        ("boot_nonce_output", path_str(&dir.file("boot_nonce.bin"))),
    ])
}

fn counting_tokens(count: usize) -> Vec<u8> {
    (0..count * TOKEN_BYTE_SIZE).map(|i| i as u8).collect()
}

fn mock_session(tokens: InjectedParam) -> MockSession {
    MockSession::new(vec![
        tokens,
        InjectedParam::new(BOOT_NONCE),
        InjectedParam::new(SIGNATURE),
    ])
}

#[test]
fn test_get_tokens_in_set_success() {
    init_logging();
    let dir = OutputDir::new();
    let inv = params(&dir);
    let tokens = counting_tokens(3);
    let mut mock = MockHoth::new();
    mock.push_security_v2_response(&[&tokens, &BOOT_NONCE, &SIGNATURE]);

    let mut session = HothSession::new(1, &mut mock);
    hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default())
        .expect("tokens in set should succeed");
    // Only the bytes the device returned count, not the whole response buffer
    assert_eq!(session.stats.bytes_received, 4 + (4 + 48) + (4 + 16) + (4 + 128));
    assert_eq!(session.stats.bytes_sent, 32);

    assert_eq!(fs::read(dir.file("tokens.bin")).unwrap(), tokens);
    assert_eq!(fs::read(dir.file("boot_nonce.bin")).unwrap(), BOOT_NONCE);
    assert_eq!(fs::read(dir.file("signature.bin")).unwrap(), SIGNATURE);
    assert_eq!(dir.entries(), 3);

    let sent = &mock.requests[0];
    assert_eq!(sent.request.len(), 12 + 4 + 16);
    let (major, minor, request_params) = parse_security_v2_request(&sent.request);
    assert_eq!((major, minor), (0x0A, 0x02));
    assert_eq!(
        request_params,
        vec![5u32.to_ne_bytes().to_vec(), vec![CHALLENGE_BYTE; 16]]
    );
}

#[test]
fn test_get_tokens_in_set_round_trip_fidelity() {
    let dir = OutputDir::new();
    let inv = params(&dir);
    let tokens = counting_tokens(40);
    let mut session = mock_session(InjectedParam::new(tokens.clone()));

    hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default()).unwrap();
    assert_eq!(session.last_command, Some(GET_TOKENS_IN_SET));
    assert_eq!(fs::read(dir.file("tokens.bin")).unwrap(), tokens);
}

#[test]
fn test_get_tokens_in_set_empty_set() {
    let dir = OutputDir::new();
    let inv = params(&dir);
    let mut session = mock_session(InjectedParam::new(Vec::new()));

    hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default()).unwrap();
    assert!(fs::read(dir.file("tokens.bin")).unwrap().is_empty());
    assert_eq!(dir.entries(), 3);
}

#[test]
fn test_get_tokens_in_set_partial_token() {
    let dir = OutputDir::new();
    let inv = params(&dir);
    let mut session = mock_session(InjectedParam::new(vec![0x42; 33]));

    let err = hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(
        err,
        HtoolError::DecodeValidation(DecodeError::NotTokenMultiple { size: 33, unit: 16 })
    ));
    assert_eq!(err.status_code(), -1);
    assert_eq!(dir.entries(), 0);
}

#[test]
fn test_get_tokens_in_set_partial_token_on_the_wire() {
    let dir = OutputDir::new();
    let inv = params(&dir);
    let mut mock = MockHoth::new();
    mock.push_security_v2_response(&[&[0x42; 20], &BOOT_NONCE, &SIGNATURE]);

    let mut session = HothSession::new(1, &mut mock);
    let err = hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(
        err,
        HtoolError::DecodeValidation(DecodeError::NotTokenMultiple { size: 20, unit: 16 })
    ));
    assert_eq!(dir.entries(), 0);
}

#[test]
fn test_get_tokens_in_set_length_exceeds_buffer() {
    let dir = OutputDir::new();
    let inv = params(&dir);
    let mut session = mock_session(InjectedParam::new(counting_tokens(2)).reporting(2048));

    let err = hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(
        err,
        HtoolError::DecodeValidation(DecodeError::ExceedsBuffer {
            size: 2048,
            capacity: MAX_TOKEN_RESPONSE_SIZE
        })
    ));
    assert_eq!(dir.entries(), 0);
}

#[test]
fn test_get_tokens_in_set_missing_boot_nonce() {
    let dir = OutputDir::new();
    let inv = params(&dir);
    let mut session = MockSession::new(vec![
        InjectedParam::new(counting_tokens(1)),
        InjectedParam::absent(),
        InjectedParam::new(SIGNATURE),
    ]);

    let err = hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(
        err,
        HtoolError::DecodeValidation(DecodeError::MissingField("boot nonce"))
    ));
    assert_eq!(dir.entries(), 0);
}

#[test]
fn test_get_tokens_in_set_missing_tokens() {
    let dir = OutputDir::new();
    let inv = params(&dir);
    let mut session = mock_session(InjectedParam::absent());

    let err = hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(
        err,
        HtoolError::DecodeValidation(DecodeError::MissingField("tokens"))
    ));
}

#[test]
fn test_get_tokens_in_set_command_failure() {
    let dir = OutputDir::new();
    let inv = params(&dir);
    let mut session = mock_session(InjectedParam::new(counting_tokens(1)));
    session.status = Some(-1);

    let err = hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert_eq!(err.status_code(), -1);
    assert_eq!(session.calls, 1);
    assert_eq!(
        session.last_request_params,
        vec![5u32.to_ne_bytes().to_vec(), vec![CHALLENGE_BYTE; 16]]
    );
    assert_eq!(dir.entries(), 0);
}

#[test]
fn test_get_tokens_in_set_bad_padding() {
    let dir = OutputDir::new();
    let inv = params(&dir);
    let mut response = security_v2_response(&[&[0x42; 14], &BOOT_NONCE, &SIGNATURE]);
    // Padding of the token param follows its 4-byte header and 14-byte value
    response[4 + 4 + 14] = 0xFF;
    let mut mock = MockHoth::new();
    mock.push_response(response);

    let mut session = HothSession::new(1, &mut mock);
    let err = hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(err, HtoolError::Transport(_)));
    assert_eq!(dir.entries(), 0);
}

#[test]
fn test_get_tokens_in_set_missing_param() {
    let dir = OutputDir::new();
    let inv = ParamMap::from_pairs([
        ("set_index", "5".to_string()),
        ("token_output", path_str(&dir.file("tokens.bin"))),
        ("signature_output", path_str(&dir.file("signature.bin"))),
    ]);
    let mut session = mock_session(InjectedParam::new(counting_tokens(1)));

    let err = hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(
        err,
        HtoolError::Parameter(ParamError::Missing(ref name)) if name == "boot_nonce_output"
    ));
    assert_eq!(session.calls, 0);
    assert_eq!(dir.entries(), 0);
}

#[test]
fn test_get_tokens_in_set_missing_set_index() {
    let dir = OutputDir::new();
    let inv = ParamMap::from_pairs([
        ("token_output", path_str(&dir.file("tokens.bin"))),
        ("signature_output", path_str(&dir.file("signature.bin"))),
        ("boot_nonce_output", path_str(&dir.file("boot_nonce.bin"))),
    ]);
    let mut session = mock_session(InjectedParam::new(counting_tokens(1)));

    let err = hoth_cmd_get_tokens_in_set(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(
        err,
        HtoolError::Parameter(ParamError::Missing(ref name)) if name == "set_index"
    ));
    assert_eq!(session.calls, 0);
    assert_eq!(dir.entries(), 0);
}
