// Licensed under the Apache-2.0 license

//! Integration tests for the token set info query

use crate::common::*;
use hoth_util_host_command_types::{
    BootNonce, DetachedChallengeResponseSignature, TokenSetInfo, GET_TOKEN_SET_INFO,
};
use hoth_util_host_commands::api::hoth_cmd_get_token_set_info;
use hoth_util_host_commands::{HtoolError, ParamError, ParamMap};
use hoth_util_host_session::HothSession;
use std::fs;
use std::mem::size_of;
use zerocopy::IntoBytes;

fn params(dir: &OutputDir, set_index: &str) -> ParamMap {
    ParamMap::from_pairs([
        ("set_index", set_index.to_string()),
        ("token_set_info", path_str(&dir.file("info.bin"))),
    ])
}

fn sample_info() -> TokenSetInfo {
    TokenSetInfo {
        category: 1,
        num_tokens: 2,
        is_frozen: 1,
        reserved_0: [0; 3],
    }
}

fn info_response(info: &TokenSetInfo) -> Vec<u8> {
    security_v2_response(&[
        info.as_bytes(),
        &[0x11; size_of::<BootNonce>()],
        &[0x22; size_of::<DetachedChallengeResponseSignature>()],
    ])
}

#[test]
fn test_get_token_set_info_success() {
    init_logging();
    let dir = OutputDir::new();
    let inv = params(&dir, "5");
    let info = sample_info();
    let mut mock = MockHoth::new();
    mock.push_response(info_response(&info));

    let mut session = HothSession::new(1, &mut mock);
    hoth_cmd_get_token_set_info(Some(&mut session), &inv, &mut FixedRandom::default())
        .expect("token set info should succeed");

    let written = fs::read(dir.file("info.bin")).unwrap();
    assert_eq!(written, info.as_bytes());
    assert_eq!(written.len(), size_of::<TokenSetInfo>());
    // Boot nonce and signature are not persisted for this query
    assert_eq!(dir.entries(), 1);

    let (major, minor, request_params) = parse_security_v2_request(&mock.requests[0].request);
    assert_eq!((major, minor), (0x0A, 0x01));
    assert_eq!(
        request_params,
        vec![5u32.to_ne_bytes().to_vec(), vec![CHALLENGE_BYTE; 16]]
    );
}

#[test]
fn test_get_token_set_info_hex_index() {
    let dir = OutputDir::new();
    let inv = params(&dir, "0x10");
    let mut session = MockSession::new(vec![
        InjectedParam::new(sample_info().as_bytes()),
        InjectedParam::new([0u8; size_of::<BootNonce>()]),
        InjectedParam::new([0u8; size_of::<DetachedChallengeResponseSignature>()]),
    ]);

    hoth_cmd_get_token_set_info(Some(&mut session), &inv, &mut FixedRandom(0x5A)).unwrap();
    assert_eq!(session.last_command, Some(GET_TOKEN_SET_INFO));
    assert_eq!(
        session.last_request_params,
        vec![16u32.to_ne_bytes().to_vec(), vec![0x5A; 16]]
    );
}

#[test]
fn test_get_token_set_info_malformed_index() {
    let dir = OutputDir::new();
    let inv = params(&dir, "five");
    let mut mock = MockHoth::new();
    mock.push_response(info_response(&sample_info()));

    let mut session = HothSession::new(1, &mut mock);
    let err = hoth_cmd_get_token_set_info(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(
        err,
        HtoolError::Parameter(ParamError::Malformed { .. })
    ));
    assert!(mock.requests.is_empty());
    assert_eq!(dir.entries(), 0);
}

#[test]
fn test_get_token_set_info_missing_index() {
    let dir = OutputDir::new();
    let inv = ParamMap::new().with("token_set_info", path_str(&dir.file("info.bin")));
    let mut session = MockSession::new(Vec::new());

    let err = hoth_cmd_get_token_set_info(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(
        err,
        HtoolError::Parameter(ParamError::Missing(ref name)) if name == "set_index"
    ));
    assert_eq!(session.calls, 0);
    assert_eq!(dir.entries(), 0);
}

#[test]
fn test_get_token_set_info_missing_output() {
    let dir = OutputDir::new();
    let inv = ParamMap::new().with("set_index", "5");
    let mut session = MockSession::new(Vec::new());

    let err = hoth_cmd_get_token_set_info(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(
        err,
        HtoolError::Parameter(ParamError::Missing(ref name)) if name == "token_set_info"
    ));
    assert_eq!(session.calls, 0);
    assert_eq!(dir.entries(), 0);
}

#[test]
fn test_get_token_set_info_device_failure() {
    let dir = OutputDir::new();
    let inv = params(&dir, "5");
    fs::write(dir.file("info.bin"), [9u8; 4]).unwrap();
    let mut mock = MockHoth::failing(-1);

    let mut session = HothSession::new(1, &mut mock);
    let err = hoth_cmd_get_token_set_info(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert_eq!(err.status_code(), -1);
    assert_eq!(fs::read(dir.file("info.bin")).unwrap(), [9u8; 4]);
    assert_eq!(dir.entries(), 1);
}

#[test]
fn test_get_token_set_info_size_mismatch() {
    let dir = OutputDir::new();
    let inv = params(&dir, "5");
    let mut mock = MockHoth::new();
    mock.push_security_v2_response(&[
        &[1, 0, 2, 0],
        &[0x11; size_of::<BootNonce>()],
        &[0x22; size_of::<DetachedChallengeResponseSignature>()],
    ]);

    let mut session = HothSession::new(1, &mut mock);
    let err = hoth_cmd_get_token_set_info(Some(&mut session), &inv, &mut FixedRandom::default())
        .unwrap_err();
    assert!(matches!(err, HtoolError::Transport(_)));
    assert_eq!(dir.entries(), 0);
}
