// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::types::Operator;

/// Plan file exactly as read from TOML, before validation.
///
/// ```toml
/// [plan]
/// raise_error = false
/// pool_size = 4
/// input = "seed"
///
/// [root]
/// type = "sequence"
/// operator = "&&"
///
/// [[root.commands]]
/// type = "shell"
/// cmd = ["echo", "hello"]
/// timeout = "5s"
/// ```
///
/// All sections are optional at this stage; [`PlanFile`] is the validated
/// form the rest of the crate works with.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPlanFile {
    /// Global settings from `[plan]`.
    #[serde(default)]
    pub plan: PlanSection,

    /// Root of the command tree from `[root]`.
    #[serde(default)]
    pub root: Option<RawNode>,
}

/// `[plan]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PlanSection {
    /// Strictness of the root command.
    #[serde(default)]
    pub raise_error: bool,

    /// Pool size for parallel nodes that don't set their own. `None` means
    /// the host's available parallelism.
    #[serde(default)]
    pub pool_size: Option<usize>,

    /// Initial input handed to the root command.
    #[serde(default)]
    pub input: Option<Value>,
}

/// One node of the command tree, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawNode {
    Shell(RawShellNode),
    Pipe(RawPipeNode),
    Sequence(RawSequenceNode),
    Parallel(RawParallelNode),
}

/// `type = "shell"`: exactly one of `cmd` (argv) or `script` (shell line).
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawShellNode {
    #[serde(default)]
    pub cmd: Option<Vec<String>>,
    #[serde(default)]
    pub script: Option<String>,
    #[serde(default)]
    pub check: Option<bool>,
    /// Duration string such as `"500ms"` or `"3s"`.
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default)]
    pub cwd: Option<PathBuf>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub inherit_env: Option<bool>,
    #[serde(default)]
    pub capture_output: Option<bool>,
    #[serde(default)]
    pub input: Option<Value>,
}

/// `type = "pipe"`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawPipeNode {
    /// Must be present (it may be empty).
    #[serde(default)]
    pub commands: Option<Vec<RawNode>>,
    #[serde(default)]
    pub input: Option<Value>,
}

/// `type = "sequence"`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSequenceNode {
    #[serde(default)]
    pub commands: Option<Vec<RawNode>>,
    /// `"&&"` (default), `"||"` or `";"`; the words `and`, `or`, `always`
    /// are accepted too.
    #[serde(default)]
    pub operator: Operator,
    #[serde(default = "default_collect_outputs")]
    pub collect_outputs: bool,
}

/// `type = "parallel"`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawParallelNode {
    #[serde(default)]
    pub commands: Option<Vec<RawNode>>,
    #[serde(default)]
    pub pool_size: Option<usize>,
    #[serde(default = "default_collect_outputs")]
    pub collect_outputs: bool,
}

fn default_collect_outputs() -> bool {
    true
}

/// Validated plan.
#[derive(Debug, Clone)]
pub struct PlanFile {
    pub plan: PlanSection,
    pub root: Node,
}

impl PlanFile {
    /// Wrap already-validated parts. Prefer `PlanFile::try_from(raw)`.
    pub(crate) fn new_unchecked(plan: PlanSection, root: Node) -> Self {
        Self { plan, root }
    }
}

/// Validated command tree node.
#[derive(Debug, Clone)]
pub enum Node {
    Shell(ShellNode),
    Pipe(PipeNode),
    Sequence(SequenceNode),
    Parallel(ParallelNode),
}

#[derive(Debug, Clone)]
pub struct ShellNode {
    /// Program followed by its arguments; never empty.
    pub argv: Vec<String>,
    pub check: bool,
    pub timeout: Option<Duration>,
    pub cwd: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub inherit_env: bool,
    pub capture_output: bool,
    pub input: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct PipeNode {
    pub commands: Vec<Node>,
    pub input: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct SequenceNode {
    pub commands: Vec<Node>,
    pub operator: Operator,
    pub collect_outputs: bool,
}

#[derive(Debug, Clone)]
pub struct ParallelNode {
    pub commands: Vec<Node>,
    pub pool_size: Option<usize>,
    pub collect_outputs: bool,
}

impl Node {
    /// Node kind as written in the plan file.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Shell(_) => "shell",
            Node::Pipe(_) => "pipe",
            Node::Sequence(_) => "sequence",
            Node::Parallel(_) => "parallel",
        }
    }

    /// Direct children (empty for leaves).
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Shell(_) => &[],
            Node::Pipe(p) => &p.commands,
            Node::Sequence(s) => &s.commands,
            Node::Parallel(p) => &p.commands,
        }
    }
}
