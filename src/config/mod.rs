// src/config/mod.rs

//! Plan files: declarative command trees for the `cmdpipe` runner.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a plan file from disk (`loader.rs`).
//! - Validate it into a [`PlanFile`] (`validate.rs`).
//! - Build the command tree from it (`build.rs`).

pub mod build;
pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{default_plan_path, load_and_validate, load_from_path, parse_plan};
pub use model::{
    Node, ParallelNode, PipeNode, PlanFile, PlanSection, RawNode, RawPlanFile, SequenceNode,
    ShellNode,
};
pub use validate::validate_plan;
