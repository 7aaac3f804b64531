// src/composite/pipe.rs

//! Shell-pipe composition: the output of child `i` is the input of child `i+1`.

use tracing::{debug, info};

use crate::command::{BoxedCommand, Command, CommandResult, CommandState, Invocation};
use crate::errors::CommandError;

/// Runs its children in order, feeding each one the previous output.
///
/// The first child that reports `succeeded == false` stops the pipe, and its
/// result becomes the pipe's result verbatim. Children after it are never
/// invoked. An empty pipe returns its own input unchanged.
#[derive(Debug, Clone)]
pub struct PipeCommand {
    state: CommandState,
    commands: Vec<BoxedCommand>,
}

impl PipeCommand {
    pub fn new(commands: Vec<BoxedCommand>) -> Self {
        Self {
            state: CommandState::new(),
            commands,
        }
    }

    pub fn with_input(mut self, input: impl Into<serde_json::Value>) -> Self {
        self.state.input_data = Some(input.into());
        self
    }

    pub fn with_raise_error(mut self, raise_error: bool) -> Self {
        self.state.raise_error = raise_error;
        self
    }

    pub fn commands(&self) -> &[BoxedCommand] {
        &self.commands
    }

    pub fn commands_mut(&mut self) -> &mut [BoxedCommand] {
        &mut self.commands
    }
}

impl Command for PipeCommand {
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
        let mut output = inv.input.clone();

        for (index, command) in self.commands.iter_mut().enumerate() {
            // A strict fault propagates straight out of the pipe.
            let result = command.run_with(output, inv.raise_error)?;

            if !result.succeeded {
                info!(
                    index,
                    command = command.name(),
                    "pipe stage failed; stopping pipe"
                );
                return Ok(result);
            }

            debug!(index, command = command.name(), "pipe stage succeeded");
            output = result.output;
        }

        Ok(CommandResult::new(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[derive(Debug, Clone, Default)]
    struct Double {
        state: CommandState,
    }

    impl Command for Double {
        fn state(&self) -> &CommandState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut CommandState {
            &mut self.state
        }

        fn execute(&mut self, inv: &Invocation) -> Result<CommandResult, CommandError> {
            let n = inv.input.as_ref().and_then(Value::as_i64).unwrap_or(1);
            Ok(CommandResult::ok(n * 2))
        }
    }

    #[test]
    fn empty_pipe_returns_its_input() {
        let mut pipe = PipeCommand::new(vec![]);
        let r = pipe.run(Some(json!("same"))).unwrap();
        assert!(r.succeeded);
        assert_eq!(r.output, Some(json!("same")));
    }

    #[test]
    fn chains_outputs() {
        let mut pipe = PipeCommand::new(vec![
            Double::default().boxed(),
            Double::default().boxed(),
            Double::default().boxed(),
        ])
        .with_input(3);
        let r = pipe.run(None).unwrap();
        assert_eq!(r.output, Some(json!(24)));
        assert_eq!(pipe.commands()[0].result().unwrap().output, Some(json!(6)));
    }
}
