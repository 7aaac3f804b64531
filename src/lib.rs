// src/lib.rs

//! Composable command execution.
//!
//! Units of work implement [`Command`]; [`PipeCommand`], [`SequentialCommand`]
//! and [`ParallelCommand`] combine them into pipelines, conditional sequences
//! and parallel batches. [`ShellCommand`] is the leaf that runs external
//! programs, and [`config`] builds whole trees from TOML plan files.

pub mod cli;
pub mod command;
pub mod composite;
pub mod config;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use std::fmt::Write as _;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::{debug, info};

pub use command::{BoxedCommand, Command, CommandResult, CommandState, Invocation};
pub use composite::{ParallelCommand, PipeCommand, SequentialCommand};
pub use errors::{CmdpipeError, CommandError};
pub use exec::ShellCommand;
pub use types::Operator;

use crate::cli::CliArgs;
use crate::config::model::{Node, PlanFile};
use crate::config::load_and_validate;

/// High-level entry point used by `main.rs`.
///
/// Loads and validates the plan, builds the command tree, runs the root and
/// prints its output. Returns whether the root result succeeded; a fault
/// escaping a strict root is returned as an error.
pub fn run(args: CliArgs) -> Result<bool> {
    let plan = load_and_validate(&args.plan)?;

    if args.dry_run {
        print!("{}", render_dry_run(&plan));
        return Ok(true);
    }

    let mut root = plan.build()?;
    if args.raise_error {
        root.set_raise_error(true);
    }

    info!(
        plan = %args.plan.display(),
        root = plan.root.kind(),
        raise_error = root.raise_error(),
        "running plan"
    );

    let result = root
        .run(args.input.map(Value::String))
        .context("root command raised a fault")?;

    info!(succeeded = result.succeeded, "plan finished");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_output(&result));
        if let Some(msg) = result.error_message.as_deref().filter(|_| !result.succeeded) {
            eprintln!("cmdpipe: {msg}");
        }
    }

    Ok(result.succeeded)
}

/// Human-readable form of a result's output: strings verbatim, everything
/// else as pretty JSON, nothing for an absent output.
pub fn render_output(result: &CommandResult) -> String {
    match &result.output {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) if s.ends_with('\n') => s.clone(),
        Some(Value::String(s)) => format!("{s}\n"),
        Some(other) => {
            let mut s = serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string());
            s.push('\n');
            s
        }
    }
}

/// Tree view of a validated plan, printed by `--dry-run`.
pub fn render_dry_run(plan: &PlanFile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "cmdpipe dry-run");
    let _ = writeln!(out, "  plan.raise_error = {}", plan.plan.raise_error);
    if let Some(size) = plan.plan.pool_size {
        let _ = writeln!(out, "  plan.pool_size = {size}");
    }
    if let Some(input) = &plan.plan.input {
        let _ = writeln!(out, "  plan.input = {input}");
    }
    let _ = writeln!(out);
    render_node(&plan.root, 0, &mut out);

    debug!("dry-run complete (no execution)");
    out
}

fn render_node(node: &Node, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth + 1);
    let _ = match node {
        Node::Shell(shell) => {
            let mut line = format!("{indent}- shell: {}", shell.argv.join(" "));
            if let Some(t) = shell.timeout {
                let _ = write!(line, " (timeout {t:?})");
            }
            if !shell.check {
                line.push_str(" (check=false)");
            }
            writeln!(out, "{line}")
        }
        Node::Pipe(p) => writeln!(out, "{indent}- pipe ({} commands)", p.commands.len()),
        Node::Sequence(s) => writeln!(
            out,
            "{indent}- sequence {} ({} commands)",
            s.operator,
            s.commands.len()
        ),
        Node::Parallel(p) => match p.pool_size {
            Some(size) => writeln!(
                out,
                "{indent}- parallel pool={size} ({} commands)",
                p.commands.len()
            ),
            None => writeln!(out, "{indent}- parallel ({} commands)", p.commands.len()),
        },
    };

    for child in node.children() {
        render_node(child, depth + 1, out);
    }
}
