// src/config/validate.rs

use crate::config::model::{
    Node, ParallelNode, PipeNode, PlanFile, RawNode, RawPlanFile, RawShellNode, SequenceNode,
    ShellNode,
};
use crate::errors::{CmdpipeError, Result};
use crate::exec::duration::parse_duration;
use crate::exec::shell::script_argv;

impl TryFrom<RawPlanFile> for PlanFile {
    type Error = CmdpipeError;

    fn try_from(raw: RawPlanFile) -> std::result::Result<Self, Self::Error> {
        validate_plan_section(&raw)?;
        let root = raw.root.ok_or_else(|| {
            CmdpipeError::ConfigError("plan must contain a [root] command".to_string())
        })?;
        let root = validate_node(root, "root")?;
        Ok(PlanFile::new_unchecked(raw.plan, root))
    }
}

fn validate_plan_section(cfg: &RawPlanFile) -> Result<()> {
    if cfg.plan.pool_size == Some(0) {
        return Err(CmdpipeError::ConfigError(
            "[plan].pool_size must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

/// Validate one node; `path` names it in error messages (`root.commands[1]`).
fn validate_node(node: RawNode, path: &str) -> Result<Node> {
    match node {
        RawNode::Shell(shell) => validate_shell(shell, path).map(Node::Shell),
        RawNode::Pipe(pipe) => Ok(Node::Pipe(PipeNode {
            commands: validate_children(pipe.commands, path)?,
            input: pipe.input,
        })),
        RawNode::Sequence(seq) => Ok(Node::Sequence(SequenceNode {
            commands: validate_children(seq.commands, path)?,
            operator: seq.operator,
            collect_outputs: seq.collect_outputs,
        })),
        RawNode::Parallel(par) => {
            if par.pool_size == Some(0) {
                return Err(CmdpipeError::ConfigError(format!(
                    "{path}: pool_size must be >= 1 (got 0)"
                )));
            }
            Ok(Node::Parallel(ParallelNode {
                commands: validate_children(par.commands, path)?,
                pool_size: par.pool_size,
                collect_outputs: par.collect_outputs,
            }))
        }
    }
}

fn validate_children(commands: Option<Vec<RawNode>>, path: &str) -> Result<Vec<Node>> {
    let commands = commands.ok_or_else(|| {
        CmdpipeError::ConfigError(format!("{path}: commands list cannot be absent"))
    })?;

    commands
        .into_iter()
        .enumerate()
        .map(|(i, child)| validate_node(child, &format!("{path}.commands[{i}]")))
        .collect()
}

fn validate_shell(shell: RawShellNode, path: &str) -> Result<ShellNode> {
    let argv = match (shell.cmd, shell.script) {
        (Some(_), Some(_)) => {
            return Err(CmdpipeError::ConfigError(format!(
                "{path}: set either `cmd` or `script`, not both"
            )));
        }
        (Some(cmd), None) => cmd,
        (None, Some(script)) => script_argv(script),
        (None, None) => {
            return Err(CmdpipeError::ConfigError(format!(
                "{path}: shell command needs `cmd` or `script`"
            )));
        }
    };

    if argv.first().is_none_or(|program| program.trim().is_empty()) {
        return Err(CmdpipeError::ConfigError(format!(
            "{path}: shell command needs a non-empty program name"
        )));
    }

    let timeout = shell
        .timeout
        .as_deref()
        .map(parse_duration)
        .transpose()
        .map_err(|e| CmdpipeError::ConfigError(format!("{path}: invalid timeout: {e}")))?;

    Ok(ShellNode {
        argv,
        check: shell.check.unwrap_or(true),
        timeout,
        cwd: shell.cwd,
        env: shell.env,
        inherit_env: shell.inherit_env.unwrap_or(true),
        capture_output: shell.capture_output.unwrap_or(true),
        input: shell.input,
    })
}

/// Validate an already-deserialized plan without consuming it.
pub fn validate_plan(cfg: &RawPlanFile) -> Result<()> {
    PlanFile::try_from(cfg.clone()).map(|_| ())
}
