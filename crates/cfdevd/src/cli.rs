//! Command-line handling for the helper binary.
//!
//! Configuration flags come first and are handed to `ortho_config`; the first
//! token that is not a configuration flag starts the subcommand, which clap
//! parses. `cfdevd --log-format compact install` therefore installs the
//! helper with compact logging.

use std::ffi::{OsStr, OsString};

use clap::{Parser, Subcommand};

/// Flags understood by the configuration loader.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--daemon-socket",
    "--log-filter",
    "--log-format",
    "--service-label",
    "--service-dir",
    "--program-path",
    "--stdout-path",
    "--stderr-path",
    "--director-ip",
    "--router-ip",
];

/// Subcommands accepted after configuration flags.
#[derive(Debug, Parser)]
#[command(name = "cfdevd", no_binary_name = true, disable_help_subcommand = true)]
struct CommandLine {
    #[command(subcommand)]
    command: Option<DaemonCommand>,
}

/// What the helper binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum DaemonCommand {
    /// Serve the helper socket in the foreground.
    Run,
    /// Install this executable as the persistent root service.
    Install,
    /// Stop and remove the persistent root service.
    Uninstall,
}

/// Parsed invocation: configuration arguments and the selected command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub(crate) config_arguments: Vec<OsString>,
    pub(crate) command: DaemonCommand,
}

/// Splits `args` (program name first) into configuration flags and the
/// subcommand.
pub(crate) fn parse_invocation(args: &[OsString]) -> Result<Invocation, clap::Error> {
    let (config_arguments, command_start) = split_config_arguments(args);
    let command_tokens = args.get(command_start..).unwrap_or_default();
    let command_line = CommandLine::try_parse_from(command_tokens)?;
    Ok(Invocation {
        config_arguments,
        command: command_line.command.unwrap_or(DaemonCommand::Run),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlagAction {
    Include { needs_value: bool },
    Stop,
}

fn classify(argument: &OsStr) -> FlagAction {
    let text = argument.to_string_lossy();
    let (flag, inline_value) = match text.split_once('=') {
        Some((flag, _)) => (flag, true),
        None => (text.as_ref(), false),
    };
    if CONFIG_CLI_FLAGS.contains(&flag) {
        FlagAction::Include {
            needs_value: !inline_value,
        }
    } else {
        FlagAction::Stop
    }
}

fn split_config_arguments(args: &[OsString]) -> (Vec<OsString>, usize) {
    let Some((program, rest)) = args.split_first() else {
        return (Vec::new(), 0);
    };

    let mut config_arguments = vec![program.clone()];
    let mut consumed = 1;
    let mut remaining = rest.iter();
    while let Some(argument) = remaining.next() {
        let FlagAction::Include { needs_value } = classify(argument) else {
            break;
        };
        config_arguments.push(argument.clone());
        consumed += 1;
        if needs_value && let Some(value) = remaining.next() {
            config_arguments.push(value.clone());
            consumed += 1;
        }
    }
    (config_arguments, consumed)
}
