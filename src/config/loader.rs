// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{PlanFile, RawPlanFile};
use crate::errors::Result;

/// Load a plan file from a given path and return the raw `RawPlanFile`.
///
/// This only performs TOML deserialization (unknown node types and operators
/// are already rejected here); it does **not** perform semantic validation.
/// Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawPlanFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_plan(&contents)
}

/// Parse plan TOML from a string.
pub fn parse_plan(contents: &str) -> Result<RawPlanFile> {
    let plan: RawPlanFile = toml::from_str(contents)?;
    Ok(plan)
}

/// Load a plan file from path and validate it.
///
/// Checks for:
/// - a `[root]` command,
/// - a `commands` list on every composite node,
/// - a program on every shell node and parseable timeouts,
/// - pool sizes of at least one.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<PlanFile> {
    let path = path.as_ref();
    let raw = load_from_path(path)?;
    let plan = PlanFile::try_from(raw)?;
    debug!(path = %path.display(), root = plan.root.kind(), "plan loaded");
    Ok(plan)
}

/// Plan file used when `--plan` is not given: `Cmdpipe.toml` in the current
/// working directory.
pub fn default_plan_path() -> PathBuf {
    PathBuf::from("Cmdpipe.toml")
}
