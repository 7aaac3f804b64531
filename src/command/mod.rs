// src/command/mod.rs

//! The uniform command contract.
//!
//! Every unit of work (leaf or composite) implements [`Command`]. Callers only
//! ever use [`Command::run`]; implementers only provide [`Command::execute`],
//! and `run` takes care of:
//! - replacing the stored input when a new one is supplied
//! - converting a raised fault into a failing [`CommandResult`]
//! - recording the result on the command before returning
//! - strict mode (`raise_error`): returning the fault as `Err` after recording
//!
//! Composites push their own strictness down to children through
//! [`Command::run_with`] instead of mutating the children's stored flag, so a
//! child reused across several parents always runs under the policy of the
//! parent that is currently invoking it.

pub mod result;

use std::fmt;

use serde_json::Value;
use tracing::{debug, trace};

use crate::errors::CommandError;

pub use result::CommandResult;

/// Owned, type-erased command. Composites own their children through this.
pub type BoxedCommand = Box<dyn Command>;

/// What an execution step gets to see for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Current input (after an optional replacement by `run`).
    pub input: Option<Value>,
    /// Effective strictness for this invocation; composites forward it to
    /// their children.
    pub raise_error: bool,
}

/// State shared by every command implementation.
#[derive(Debug, Clone, Default)]
pub struct CommandState {
    pub input_data: Option<Value>,
    pub result: Option<CommandResult>,
    pub raise_error: bool,
}

impl CommandState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, input: impl Into<Value>) -> Self {
        self.input_data = Some(input.into());
        self
    }

    pub fn with_raise_error(mut self, raise_error: bool) -> Self {
        self.raise_error = raise_error;
        self
    }
}

/// Produces an isolated, owned copy of a command.
///
/// Implemented automatically for every `Clone` command. The parallel composite
/// hands these snapshots to its workers; nothing a snapshot does to itself is
/// visible on the original.
pub trait CommandSnapshot {
    fn snapshot(&self) -> BoxedCommand;
}

impl<T> CommandSnapshot for T
where
    T: Command + Clone + 'static,
{
    fn snapshot(&self) -> BoxedCommand {
        Box::new(self.clone())
    }
}

impl Clone for BoxedCommand {
    fn clone(&self) -> Self {
        self.snapshot()
    }
}

/// A unit of work with a uniform run/result contract.
pub trait Command: CommandSnapshot + Send + fmt::Debug {
    /// Shared state (input, last result, strictness).
    fn state(&self) -> &CommandState;

    fn state_mut(&mut self) -> &mut CommandState;

    /// The implementation-specific execution step.
    ///
    /// Returning `Err` is how a command raises a fault. A soft failure is an
    /// `Ok` result with `succeeded == false`.
    fn execute(&mut self, invocation: &Invocation) -> Result<CommandResult, CommandError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Run the command under its own `raise_error` policy.
    ///
    /// Never returns `Err` unless `raise_error` is set and the execution step
    /// raised a fault.
    fn run(&mut self, input: Option<Value>) -> Result<CommandResult, CommandError> {
        let raise_error = self.state().raise_error;
        self.run_with(input, raise_error)
    }

    /// Run the command under an explicit strictness policy.
    ///
    /// The stored result is always updated before this returns, including
    /// when a fault is propagated.
    fn run_with(
        &mut self,
        input: Option<Value>,
        raise_error: bool,
    ) -> Result<CommandResult, CommandError> {
        if let Some(input) = input {
            self.state_mut().input_data = Some(input);
        }

        let invocation = Invocation {
            input: self.state().input_data.clone(),
            raise_error,
        };

        trace!(command = self.name(), raise_error, "executing command");

        match self.execute(&invocation) {
            Ok(result) => {
                debug!(
                    command = self.name(),
                    succeeded = result.succeeded,
                    "command finished"
                );
                self.state_mut().result = Some(result.clone());
                Ok(result)
            }
            Err(fault) => {
                debug!(
                    command = self.name(),
                    error = %fault,
                    raise_error,
                    "command raised a fault"
                );
                let result = CommandResult::from_error(&fault);
                self.state_mut().result = Some(result.clone());
                if raise_error {
                    Err(fault)
                } else {
                    Ok(result)
                }
            }
        }
    }

    /// Last recorded result, or `None` if the command never ran.
    fn result(&self) -> Option<&CommandResult> {
        self.state().result.as_ref()
    }

    /// Direct children of a composite; empty for leaves.
    fn children(&self) -> &[BoxedCommand] {
        &[]
    }

    fn input_data(&self) -> Option<&Value> {
        self.state().input_data.as_ref()
    }

    fn raise_error(&self) -> bool {
        self.state().raise_error
    }

    fn set_raise_error(&mut self, raise_error: bool) {
        self.state_mut().raise_error = raise_error;
    }

    fn set_input(&mut self, input: Option<Value>) {
        self.state_mut().input_data = input;
    }

    /// Overwrite the recorded result (used when reconciling results that were
    /// produced on a snapshot).
    fn set_result(&mut self, result: CommandResult) {
        self.state_mut().result = Some(result);
    }

    fn boxed(self) -> BoxedCommand
    where
        Self: Sized + 'static,
    {
        Box::new(self)
    }
}
