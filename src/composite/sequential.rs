// src/composite/sequential.rs

//! Conditional sequences mirroring the shell operators `&&`, `||` and `;`.

use serde_json::Value;
use tracing::{debug, warn};

use crate::command::{BoxedCommand, Command, CommandResult, CommandState, Invocation};
use crate::errors::{CmdpipeError, CommandError};
use crate::types::{Operator, parse_operator};

/// What the sequence does after a child has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Continue,
    Stop,
}

/// Runs independent children one after another.
///
/// Children do not see each other's output. After each child:
/// - `&&`: stop if it failed
/// - `||`: stop if it succeeded
/// - `;` (`None`): never stop
///
/// A strict child fault never escapes the sequence: a `null` placeholder is
/// collected for it and it counts as a failure for the continuation policy.
#[derive(Debug, Clone)]
pub struct SequentialCommand {
    state: CommandState,
    commands: Vec<BoxedCommand>,
    operator: Option<Operator>,
    collect_outputs: bool,
}

impl SequentialCommand {
    /// New `&&` sequence that collects outputs.
    pub fn new(commands: Vec<BoxedCommand>) -> Self {
        Self {
            state: CommandState::new(),
            commands,
            operator: Some(Operator::And),
            collect_outputs: true,
        }
    }

    /// Build a sequence from an operator string (`"&&"`, `"||"`, `";"`) or
    /// `None` for "always". Unknown operators are rejected.
    pub fn with_operator_str(
        commands: Vec<BoxedCommand>,
        operator: Option<&str>,
    ) -> Result<Self, CmdpipeError> {
        let operator = parse_operator(operator)?;
        Ok(Self::new(commands).with_operator(operator))
    }

    pub fn with_operator(mut self, operator: Option<Operator>) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_collect_outputs(mut self, collect_outputs: bool) -> Self {
        self.collect_outputs = collect_outputs;
        self
    }

    pub fn with_raise_error(mut self, raise_error: bool) -> Self {
        self.state.raise_error = raise_error;
        self
    }

    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    pub fn collect_outputs(&self) -> bool {
        self.collect_outputs
    }

    pub fn commands(&self) -> &[BoxedCommand] {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut [BoxedCommand] {
        &mut self.commands
    }

    fn effective_operator(&self) -> Operator {
        self.operator.unwrap_or(Operator::Always)
    }
}

/// Continuation decision for a child that ran to completion.
fn after_result(operator: Operator, succeeded: bool) -> Step {
    match (operator, succeeded) {
        (Operator::And, false) | (Operator::Or, true) => Step::Stop,
        _ => Step::Continue,
    }
}

/// Continuation decision for a child that raised under strict mode.
fn after_fault(operator: Operator) -> Step {
    match operator {
        Operator::And => Step::Stop,
        Operator::Or | Operator::Always => Step::Continue,
    }
}

impl Command for SequentialCommand {
    fn state(&self) -> &CommandState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }

    fn children(&self) -> &[BoxedCommand] {
        &self.commands
    }

    fn execute(&mut self, inv: &Invocation) -> Result<CommandResult, CommandError> {
        let operator = self.effective_operator();
        let collect = self.collect_outputs;

        let mut outputs: Vec<Value> = Vec::new();
        let mut last_succeeded: Option<bool> = None;

        for (index, command) in self.commands.iter_mut().enumerate() {
            let step = match command.run_with(None, inv.raise_error) {
                Ok(result) => {
                    if collect {
                        outputs.push(result.output_or_null());
                    }
                    last_succeeded = Some(result.succeeded);
                    after_result(operator, result.succeeded)
                }
                Err(fault) => {
                    warn!(
                        index,
                        command = command.name(),
                        error = %fault,
                        "child raised in sequence; recording placeholder"
                    );
                    if collect {
                        outputs.push(Value::Null);
                    }
                    // The child recorded its failing result before raising.
                    last_succeeded = Some(command.result().is_some_and(|r| r.succeeded));
                    after_fault(operator)
                }
            };

            if step == Step::Stop {
                debug!(index, %operator, "sequence stopping early");
                break;
            }
        }

        Ok(CommandResult {
            output: collect.then(|| Value::Array(outputs)),
            succeeded: last_succeeded.unwrap_or(false),
            error: None,
            error_message: None,
            metadata: None,
        })
    }
}
