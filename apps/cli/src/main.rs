// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `scpatch` - apply a patch document to a model's artifacts.
//!
//! ```text
//! scpatch init  --output-dir out --model microengine
//! scpatch apply --output-dir out --model microengine --patch edits.json
//! cat edits.json | scpatch apply --output-dir out --model microengine --patch -
//! ```
//!
//! The run report is printed to stdout as JSON; logs go to stderr.

use anyhow::Context;
use clap::{value_parser, Arg, ArgMatches, Command};
use scpatch_processing::{init_scene, run_patch, RunConfig, SAMPLE_PATCH};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn target_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("output-dir")
            .long("output-dir")
            .env("SCPATCH_OUTPUT_DIR")
            .required(true)
            .value_parser(value_parser!(PathBuf))
            .help("Directory holding the model artifacts"),
    )
    .arg(
        Arg::new("model")
            .long("model")
            .env("SCPATCH_MODEL_NAME")
            .required(true)
            .help("Model name, the stem of every artifact file"),
    )
}

fn command() -> Command {
    Command::new("scpatch")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Apply scene patches to model artifacts")
        .subcommand_required(true)
        .subcommand(
            target_args(Command::new("apply").about("Apply a patch document")).arg(
                Arg::new("patch")
                    .long("patch")
                    .help("Patch file, or - for stdin (default: built-in sample patch)"),
            ),
        )
        .subcommand(target_args(
            Command::new("init").about("Write a seed scene and discard any baseline"),
        ))
}

fn run_config(args: &ArgMatches) -> anyhow::Result<RunConfig> {
    let output_dir = args
        .get_one::<PathBuf>("output-dir")
        .context("missing --output-dir")?;
    let model = args.get_one::<String>("model").context("missing --model")?;
    Ok(RunConfig::new(output_dir.clone(), model.clone()))
}

fn read_patch(source: Option<&String>) -> anyhow::Result<String> {
    match source.map(String::as_str) {
        None => Ok(SAMPLE_PATCH.to_string()),
        Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("reading patch from stdin")?;
            Ok(text)
        }
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("reading patch file {path}"))
        }
    }
}

fn dispatch(matches: &ArgMatches) -> anyhow::Result<()> {
    match matches.subcommand() {
        Some(("apply", args)) => {
            let config = run_config(args)?;
            let patch = read_patch(args.get_one::<String>("patch"))?;
            let report = run_patch(&config, &patch)?;
            if let Some(failure) = &report.parse_error {
                tracing::warn!(message = %failure.message, "Patch was not applied");
            }
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Some(("init", args)) => {
            let config = run_config(args)?;
            let stream = init_scene(&config)?;
            println!("{}", serde_json::to_string_pretty(&stream)?);
        }
        _ => anyhow::bail!("unknown subcommand"),
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,scpatch=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = command().get_matches();
    match dispatch(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "scpatch failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn test_apply_arguments() {
        let matches = command()
            .try_get_matches_from([
                "scpatch",
                "apply",
                "--output-dir",
                "out",
                "--model",
                "engine",
                "--patch",
                "-",
            ])
            .unwrap();
        let (name, args) = matches.subcommand().unwrap();
        assert_eq!(name, "apply");
        let config = run_config(args).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.model_name, "engine");
        assert_eq!(args.get_one::<String>("patch").map(String::as_str), Some("-"));
    }

    #[test]
    fn test_missing_patch_uses_sample() {
        assert_eq!(read_patch(None).unwrap(), SAMPLE_PATCH);
    }

    #[test]
    fn test_unreadable_patch_file_is_an_error() {
        let missing = "/nonexistent/scpatch/patch.json".to_string();
        assert!(read_patch(Some(&missing)).is_err());
    }
}
