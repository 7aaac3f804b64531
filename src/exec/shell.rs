// src/exec/shell.rs

//! Leaf command that runs an external program.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::{Value, json};
use tracing::debug;

use crate::command::{Command, CommandResult, CommandState, Invocation};
use crate::errors::{CmdpipeError, CommandError};
use crate::exec::process::{ProcessSpec, run_process};

/// Argv that runs `cmdline` through the platform shell.
pub fn script_argv(cmdline: impl Into<String>) -> Vec<String> {
    if cfg!(windows) {
        vec!["cmd".to_string(), "/C".to_string(), cmdline.into()]
    } else {
        vec!["sh".to_string(), "-c".to_string(), cmdline.into()]
    }
}

/// Runs `program args...` as a subprocess.
///
/// - Input: a string input is written to stdin verbatim, any other JSON value
///   as its JSON text. No input means stdin is connected to null.
/// - Output: captured stdout as a JSON string (absent when not capturing).
/// - Metadata: `{ "exit_code", "stdout", "stderr" }`.
///
/// With `check` enabled (default) a non-zero exit raises
/// [`CommandError::NonZeroExit`]. A missing program raises
/// [`CommandError::CommandNotFound`] and an expired timeout raises
/// [`CommandError::Timeout`]; the matching `failed_with_*` flag is set for
/// inspection after the run.
#[derive(Debug, Clone)]
pub struct ShellCommand {
    state: CommandState,
    program: String,
    args: Vec<String>,
    capture_output: bool,
    check: bool,
    timeout: Option<Duration>,
    cwd: Option<PathBuf>,
    env: BTreeMap<String, String>,
    inherit_env: bool,
    failed_with_timeout: bool,
    failed_with_command_not_found: bool,
}

impl ShellCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            state: CommandState::new(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            capture_output: true,
            check: true,
            timeout: None,
            cwd: None,
            env: BTreeMap::new(),
            inherit_env: true,
            failed_with_timeout: false,
            failed_with_command_not_found: false,
        }
    }

    /// Build from an argv vector; the first element is the program.
    pub fn from_argv(argv: &[String]) -> Result<Self, CmdpipeError> {
        let (program, args) = argv.split_first().ok_or_else(|| {
            CmdpipeError::ConfigError("shell command needs at least a program name".to_string())
        })?;
        if program.trim().is_empty() {
            return Err(CmdpipeError::ConfigError(
                "shell command program name is empty".to_string(),
            ));
        }
        Ok(Self::new(program.clone(), args.iter().cloned()))
    }

    /// Run a command line through the platform shell (`sh -c` / `cmd /C`).
    pub fn script(cmdline: impl Into<String>) -> Self {
        let mut argv = script_argv(cmdline);
        let program = argv.remove(0);
        Self::new(program, argv)
    }

    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    pub fn check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn inherit_env(mut self, inherit: bool) -> Self {
        self.inherit_env = inherit;
        self
    }

    pub fn with_input(mut self, input: impl Into<Value>) -> Self {
        self.state.input_data = Some(input.into());
        self
    }

    pub fn with_raise_error(mut self, raise_error: bool) -> Self {
        self.state.raise_error = raise_error;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The last run was killed because its timeout expired.
    pub fn failed_with_timeout(&self) -> bool {
        self.failed_with_timeout
    }

    /// The last run could not start because the program does not exist.
    pub fn failed_with_command_not_found(&self) -> bool {
        self.failed_with_command_not_found
    }

    fn spec(&self, input: Option<&Value>) -> ProcessSpec {
        let stdin = input.and_then(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone().into_bytes()),
            other => Some(other.to_string().into_bytes()),
        });

        ProcessSpec {
            program: self.program.clone(),
            args: self.args.clone(),
            cwd: self.cwd.clone(),
            env: self.env.clone(),
            inherit_env: self.inherit_env,
            capture_output: self.capture_output,
            timeout: self.timeout,
            stdin,
        }
    }
}

impl Command for ShellCommand {
    fn state(&self) -> &CommandState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }

    fn name(&self) -> &str {
        &self.program
    }

    fn execute(&mut self, inv: &Invocation) -> Result<CommandResult, CommandError> {
        self.failed_with_timeout = false;
        self.failed_with_command_not_found = false;

        let spec = self.spec(inv.input.as_ref());
        let out = match run_process(&spec) {
            Ok(out) => out,
            Err(e) => {
                match &e {
                    CommandError::Timeout { .. } => self.failed_with_timeout = true,
                    CommandError::CommandNotFound(_) => self.failed_with_command_not_found = true,
                    _ => {}
                }
                return Err(e);
            }
        };

        if self.check && !out.success {
            debug!(program = %self.program, exit_code = out.code, "non-zero exit with check enabled");
            return Err(CommandError::NonZeroExit {
                code: out.code,
                stderr: out.stderr.trim_end().to_string(),
            });
        }

        let metadata = json!({
            "exit_code": out.code,
            "stdout": &out.stdout,
            "stderr": &out.stderr,
        });
        let output = self.capture_output.then(|| Value::String(out.stdout));

        Ok(CommandResult::new(output).with_metadata(metadata))
    }
}
