// Licensed under the Apache-2.0 license

//! Command table
//!
//! Maps `<group> <verb>` invocations to the API functions, declares the named
//! parameters each one consumes, and builds the matching `clap` command tree.

use crate::api::{
    hoth_cmd_get_provisioning_log, hoth_cmd_get_token_set_count, hoth_cmd_get_token_set_info,
    hoth_cmd_get_tokens_in_set, hoth_cmd_validate_and_sign,
};
use crate::error::HtoolResult;
use crate::invocation::{Invocation, ParamMap};
use crate::nonce::SecureRandom;
use anyhow::Result;
use clap::{value_parser, Arg, ArgMatches, Command};
use clap_num::maybe_hex;
use hoth_util_host_session::CommandSession;
use log::debug;
use std::path::PathBuf;

pub type HtoolCommandFn = fn(
    Option<&mut dyn CommandSession>,
    &dyn Invocation,
    &mut dyn SecureRandom,
) -> HtoolResult<()>;

/// A named parameter consumed by a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtoolParam {
    String {
        name: &'static str,
        help: &'static str,
    },
    U32 {
        name: &'static str,
        help: &'static str,
    },
}

impl HtoolParam {
    pub fn name(&self) -> &'static str {
        match self {
            HtoolParam::String { name, .. } | HtoolParam::U32 { name, .. } => name,
        }
    }

    fn arg(&self) -> Arg {
        match *self {
            HtoolParam::String { name, help } => Arg::new(name).long(name).help(help),
            HtoolParam::U32 { name, help } => Arg::new(name)
                .long(name)
                .help(help)
                .value_parser(maybe_hex::<u32>),
        }
    }
}

pub struct HtoolCommand {
    pub verbs: &'static [&'static str],
    pub desc: &'static str,
    pub params: &'static [HtoolParam],
    pub func: HtoolCommandFn,
}

impl HtoolCommand {
    fn clap_subcommand(&self) -> Command {
        let verb = self.verbs.last().copied().unwrap_or_default();
        self.params
            .iter()
            .fold(Command::new(verb).about(self.desc), |cmd, param| {
                cmd.arg(param.arg())
            })
    }
}

const BOOT_NONCE_OUTPUT: HtoolParam = HtoolParam::String {
    name: "boot_nonce_output",
    help: "File the boot nonce is written to",
};

const SIGNATURE_OUTPUT: HtoolParam = HtoolParam::String {
    name: "signature_output",
    help: "File the detached signature is written to",
};

const SET_INDEX: HtoolParam = HtoolParam::U32 {
    name: "set_index",
    help: "Index of the token set",
};

pub static HTOOL_COMMANDS: &[HtoolCommand] = &[
    HtoolCommand {
        verbs: &["security", "get-token-set-count"],
        desc: "Get the number of token sets on the device",
        params: &[
            HtoolParam::String {
                name: "num_ids_output",
                help: "File the token set count is written to",
            },
            BOOT_NONCE_OUTPUT,
            SIGNATURE_OUTPUT,
        ],
        func: hoth_cmd_get_token_set_count,
    },
    HtoolCommand {
        verbs: &["security", "get-token-set-info"],
        desc: "Get the info record of a token set",
        params: &[
            SET_INDEX,
            HtoolParam::String {
                name: "token_set_info",
                help: "File the token set info is written to",
            },
        ],
        func: hoth_cmd_get_token_set_info,
    },
    HtoolCommand {
        verbs: &["security", "get-tokens-in-set"],
        desc: "Get the tokens of a token set",
        params: &[
            SET_INDEX,
            HtoolParam::String {
                name: "token_output",
                help: "File the tokens are written to",
            },
            BOOT_NONCE_OUTPUT,
            SIGNATURE_OUTPUT,
        ],
        func: hoth_cmd_get_tokens_in_set,
    },
    HtoolCommand {
        verbs: &["provisioning", "get-log"],
        desc: "Read the provisioning log",
        params: &[HtoolParam::String {
            name: "output",
            help: "File the provisioning log is written to",
        }],
        func: get_provisioning_log,
    },
    HtoolCommand {
        verbs: &["provisioning", "validate-and-sign"],
        desc: "Have the device validate and sign a perso blob",
        params: &[
            HtoolParam::String {
                name: "perso_blob",
                help: "Perso blob to validate and sign",
            },
            HtoolParam::String {
                name: "output",
                help: "File the signed result is written to",
            },
        ],
        func: validate_and_sign,
    },
];

fn get_provisioning_log(
    session: Option<&mut dyn CommandSession>,
    inv: &dyn Invocation,
    _rng: &mut dyn SecureRandom,
) -> HtoolResult<()> {
    hoth_cmd_get_provisioning_log(session, inv)
}

fn validate_and_sign(
    session: Option<&mut dyn CommandSession>,
    inv: &dyn Invocation,
    _rng: &mut dyn SecureRandom,
) -> HtoolResult<()> {
    hoth_cmd_validate_and_sign(session, inv)
}

/// Build the `<group> <verb>` command tree for every registered command
pub fn clap_command() -> Command {
    let mut root = Command::new("htool")
        .about("Hoth security and provisioning commands")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("params")
                .long("params")
                .value_name("FILE")
                .help("TOML file of command parameters")
                .value_parser(value_parser!(PathBuf))
                .global(true),
        );

    let mut groups: Vec<&'static str> = Vec::new();
    for cmd in HTOOL_COMMANDS {
        if let Some(group) = cmd.verbs.first() {
            if !groups.contains(group) {
                groups.push(group);
            }
        }
    }

    for group in groups {
        let subcommands = HTOOL_COMMANDS
            .iter()
            .filter(|cmd| cmd.verbs.first() == Some(&group))
            .map(HtoolCommand::clap_subcommand);
        root = root.subcommand(
            Command::new(group)
                .subcommand_required(true)
                .subcommands(subcommands),
        );
    }
    root
}

/// Resolve the invoked command and its parameters
///
/// Values from a `--params` file are overlaid by values given on the command
/// line.
pub fn find_command(matches: &ArgMatches) -> Result<Option<(&'static HtoolCommand, ParamMap)>> {
    let Some((group, group_matches)) = matches.subcommand() else {
        return Ok(None);
    };
    let Some((verb, cmd_matches)) = group_matches.subcommand() else {
        return Ok(None);
    };
    let Some(cmd) = HTOOL_COMMANDS
        .iter()
        .find(|cmd| cmd.verbs.iter().copied().eq([group, verb]))
    else {
        return Ok(None);
    };

    let mut inv = match cmd_matches.get_one::<PathBuf>("params") {
        Some(path) => ParamMap::from_file(path)?,
        None => ParamMap::new(),
    };
    inv.merge(ParamMap::from_arg_matches(cmd.params, cmd_matches));
    Ok(Some((cmd, inv)))
}

/// Run `cmd`, returning `0` on success or the failure's status code
pub fn run_command(
    cmd: &HtoolCommand,
    session: Option<&mut dyn CommandSession>,
    inv: &dyn Invocation,
    rng: &mut dyn SecureRandom,
) -> i32 {
    match (cmd.func)(session, inv, rng) {
        Ok(()) => 0,
        Err(e) => {
            debug!("{} failed: {}", cmd.verbs.join(" "), e);
            e.status_code()
        }
    }
}
