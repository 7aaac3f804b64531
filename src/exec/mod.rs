// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`shell`] provides [`ShellCommand`], the leaf command that wraps an
//!   external program.
//! - [`process`] actually spawns and waits for the process using
//!   `tokio::process::Command`.
//! - [`duration`] parses the short duration strings used for timeouts.

pub mod duration;
pub mod process;
pub mod shell;

pub use duration::parse_duration;
pub use process::{ProcessOutput, ProcessSpec, run_process};
pub use shell::ShellCommand;
