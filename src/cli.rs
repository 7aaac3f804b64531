// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_plan_path;

/// Command-line arguments for `cmdpipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cmdpipe",
    version,
    about = "Run a tree of piped, sequential and parallel commands from a plan file.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the plan file (TOML).
    ///
    /// Default: `Cmdpipe.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_plan_path())]
    pub plan: PathBuf,

    /// Input for the root command; overrides `[plan].input`.
    #[arg(long, value_name = "STRING")]
    pub input: Option<String>,

    /// Run the root command in strict mode: the first raised fault aborts the
    /// run.
    #[arg(long)]
    pub raise_error: bool,

    /// Print the root result as JSON instead of just its output.
    #[arg(long)]
    pub json: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CMDPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the command tree, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = CliArgs::try_parse_from(["cmdpipe"]).unwrap();
        assert_eq!(args.plan, default_plan_path());
        assert_eq!(args.plan, PathBuf::from("Cmdpipe.toml"));
        assert!(args.input.is_none());
        assert!(!args.raise_error);
        assert!(!args.dry_run);
    }

    #[test]
    fn flags_are_parsed() {
        let args = CliArgs::try_parse_from([
            "cmdpipe",
            "--plan",
            "build.toml",
            "--input",
            "seed",
            "--raise-error",
            "--json",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.plan, PathBuf::from("build.toml"));
        assert_eq!(args.input.as_deref(), Some("seed"));
        assert!(args.raise_error);
        assert!(args.json);
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
