// src/config/build.rs

//! Turn a validated [`PlanFile`] into a tree of command objects.

use crate::command::{BoxedCommand, Command};
use crate::composite::{ParallelCommand, PipeCommand, SequentialCommand};
use crate::config::model::{Node, PlanFile, ShellNode};
use crate::errors::Result;
use crate::exec::ShellCommand;

impl PlanFile {
    /// Build the root command. The root gets `[plan].raise_error` and
    /// `[plan].input`.
    pub fn build(&self) -> Result<BoxedCommand> {
        let mut root = build_node(&self.root, self.plan.pool_size)?;
        root.set_raise_error(self.plan.raise_error);
        if let Some(input) = &self.plan.input {
            root.set_input(Some(input.clone()));
        }
        Ok(root)
    }
}

fn build_node(node: &Node, default_pool_size: Option<usize>) -> Result<BoxedCommand> {
    let children = |nodes: &[Node]| -> Result<Vec<BoxedCommand>> {
        nodes
            .iter()
            .map(|n| build_node(n, default_pool_size))
            .collect()
    };

    let command = match node {
        Node::Shell(shell) => build_shell(shell).boxed(),
        Node::Pipe(pipe) => {
            let mut cmd = PipeCommand::new(children(&pipe.commands)?);
            if let Some(input) = &pipe.input {
                cmd = cmd.with_input(input.clone());
            }
            cmd.boxed()
        }
        Node::Sequence(seq) => SequentialCommand::new(children(&seq.commands)?)
            .with_operator(Some(seq.operator))
            .with_collect_outputs(seq.collect_outputs)
            .boxed(),
        Node::Parallel(par) => {
            let mut cmd = ParallelCommand::new(children(&par.commands)?)
                .with_collect_outputs(par.collect_outputs);
            if let Some(size) = par.pool_size.or(default_pool_size) {
                cmd = cmd.with_pool_size(size)?;
            }
            cmd.boxed()
        }
    };

    Ok(command)
}

fn build_shell(shell: &ShellNode) -> ShellCommand {
    // Validation guarantees a program.
    let (program, args) = shell
        .argv
        .split_first()
        .map(|(p, a)| (p.clone(), a.to_vec()))
        .unwrap_or_default();

    let mut cmd = ShellCommand::new(program, args)
        .check(shell.check)
        .capture_output(shell.capture_output)
        .inherit_env(shell.inherit_env);

    if let Some(timeout) = shell.timeout {
        cmd = cmd.timeout(timeout);
    }
    if let Some(cwd) = &shell.cwd {
        cmd = cmd.cwd(cwd.clone());
    }
    for (key, value) in &shell.env {
        cmd = cmd.env(key.clone(), value.clone());
    }
    if let Some(input) = &shell.input {
        cmd = cmd.with_input(input.clone());
    }
    cmd
}
