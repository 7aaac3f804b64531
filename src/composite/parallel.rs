// src/composite/parallel.rs

//! Parallel batches of independent commands.

use serde_json::Value;
use tracing::{debug, info};

use crate::command::{BoxedCommand, Command, CommandResult, CommandState, Invocation};
use crate::composite::pool::{Job, WorkerPool, default_pool_size};
use crate::errors::{CmdpipeError, CommandError};

/// Runs independent children concurrently on a fixed-size worker pool.
///
/// Each worker executes an isolated snapshot of a child. Once the whole batch
/// has reported, the executed snapshots are moved back into this command's
/// child slots by submission index, carrying the results of their subtrees.
///
/// The batch itself always succeeds; per-child outcomes are read from each
/// child's own result.
#[derive(Debug, Clone)]
pub struct ParallelCommand {
    state: CommandState,
    commands: Vec<BoxedCommand>,
    pool_size: usize,
    collect_outputs: bool,
}

impl ParallelCommand {
    /// New batch sized to the host's available parallelism, collecting
    /// outputs.
    pub fn new(commands: Vec<BoxedCommand>) -> Self {
        Self {
            state: CommandState::new(),
            commands,
            pool_size: default_pool_size(),
            collect_outputs: true,
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Result<Self, CmdpipeError> {
        if pool_size == 0 {
            return Err(CmdpipeError::ConfigError(
                "parallel pool_size must be >= 1 (got 0)".to_string(),
            ));
        }
        self.pool_size = pool_size;
        Ok(self)
    }

    pub fn with_collect_outputs(mut self, collect_outputs: bool) -> Self {
        self.collect_outputs = collect_outputs;
        self
    }

    pub fn with_raise_error(mut self, raise_error: bool) -> Self {
        self.state.raise_error = raise_error;
        self
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
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
}

impl Command for ParallelCommand {
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
        let jobs: Vec<Job> = self
            .commands
            .iter()
            .enumerate()
            .map(|(index, command)| Job {
                index,
                command: command.snapshot(),
                raise_error: inv.raise_error,
            })
            .collect();

        info!(
            children = jobs.len(),
            pool_size = self.pool_size,
            "dispatching parallel batch"
        );

        let outcomes = WorkerPool::new(self.pool_size).run_all(jobs)?;

        // Reconcile: the pool has drained. Each executed snapshot replaces the
        // child it was taken from, so results recorded anywhere in its subtree
        // are visible here. A panicked job only has its failing result.
        let mut results = Vec::with_capacity(outcomes.len());
        for (slot, outcome) in self.commands.iter_mut().zip(outcomes) {
            if let Some(executed) = outcome.command {
                *slot = executed;
            }
            slot.set_result(outcome.result.clone());
            results.push(outcome.result);
        }

        let failed = results.iter().filter(|r| !r.succeeded).count();
        debug!(
            children = results.len(),
            failed, "parallel batch reconciled"
        );

        let output = self.collect_outputs.then(|| {
            Value::Array(results.iter().map(CommandResult::output_or_null).collect())
        });

        Ok(CommandResult::new(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_pool_size_is_rejected() {
        let err = ParallelCommand::new(vec![]).with_pool_size(0).unwrap_err();
        assert!(matches!(err, CmdpipeError::ConfigError(msg) if msg.contains("pool_size")));
    }

    #[test]
    fn empty_batch_succeeds_with_empty_output() {
        let mut par = ParallelCommand::new(vec![]);
        let r = par.run(None).unwrap();
        assert!(r.succeeded);
        assert_eq!(r.output, Some(Value::Array(vec![])));
    }

    #[test]
    fn no_output_when_not_collecting() {
        let mut par = ParallelCommand::new(vec![]).with_collect_outputs(false);
        let r = par.run(None).unwrap();
        assert!(r.succeeded);
        assert!(r.output.is_none());
    }
}
