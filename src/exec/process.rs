// src/exec/process.rs

//! Subprocess runner used by [`ShellCommand`](super::ShellCommand).
//!
//! Processes are driven with `tokio::process` on a small current-thread
//! runtime created per invocation, so the synchronous command contract can be
//! kept while still getting piped stdio, timeouts and `kill_on_drop`.
//! Because of that, [`run_process`] must not be called from inside an async
//! task; use `tokio::task::spawn_blocking` there.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::errors::CommandError;

/// Everything needed to start one process.
#[derive(Debug, Clone, Default)]
pub struct ProcessSpec {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub inherit_env: bool,
    pub capture_output: bool,
    pub timeout: Option<Duration>,
    /// Bytes written to the child's stdin; `None` connects stdin to null.
    pub stdin: Option<Vec<u8>>,
}

/// Exit information of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `-1` when the process was terminated by a signal.
    pub code: i32,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Run a process to completion (or until its timeout expires).
pub fn run_process(spec: &ProcessSpec) -> Result<ProcessOutput, CommandError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_process_async(spec))
}

async fn run_process_async(spec: &ProcessSpec) -> Result<ProcessOutput, CommandError> {
    info!(
        program = %spec.program,
        args = ?spec.args,
        timeout = ?spec.timeout,
        "starting process"
    );

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args);

    if !spec.inherit_env {
        cmd.env_clear();
    }
    cmd.envs(&spec.env);

    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    let output_stdio = || {
        if spec.capture_output {
            Stdio::piped()
        } else {
            Stdio::inherit()
        }
    };

    cmd.stdin(if spec.stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    })
    .stdout(output_stdio())
    .stderr(output_stdio())
    .kill_on_drop(true);

    let mut child = cmd.spawn().map_err(|e| match e.kind() {
        ErrorKind::NotFound => CommandError::CommandNotFound(spec.program.clone()),
        _ => CommandError::from(e),
    })?;

    // Feed stdin from a separate task so a child that writes a lot before
    // reading cannot deadlock against us.
    if let (Some(data), Some(mut pipe)) = (spec.stdin.clone(), child.stdin.take()) {
        let program = spec.program.clone();
        tokio::spawn(async move {
            if let Err(e) = pipe.write_all(&data).await {
                debug!(program = %program, error = %e, "failed to write stdin");
            }
            // Dropping the pipe closes the child's stdin.
        });
    }

    let wait = child.wait_with_output();
    let output = match spec.timeout {
        Some(limit) => match tokio::time::timeout(limit, wait).await {
            Ok(res) => res?,
            Err(_) => {
                // Dropping the wait future drops the child, which kills it.
                warn!(program = %spec.program, timeout = ?limit, "process timed out; killed");
                return Err(CommandError::Timeout {
                    program: spec.program.clone(),
                    timeout: limit,
                });
            }
        },
        None => wait.await?,
    };

    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    for line in stderr.lines() {
        debug!(program = %spec.program, "stderr: {}", line);
    }

    info!(
        program = %spec.program,
        exit_code = code,
        success = output.status.success(),
        "process exited"
    );

    Ok(ProcessOutput {
        code,
        success: output.status.success(),
        stdout,
        stderr,
    })
}
