// src/errors.rs

//! Crate-wide error types.
//!
//! Two families live here:
//! - [`CmdpipeError`]: configuration / loading problems. These are raised at
//!   construction time and are never swallowed by the engine.
//! - [`CommandError`]: a fault raised by a command's execution step. Faults are
//!   recorded in a [`CommandResult`](crate::command::CommandResult), so they
//!   must be cheap to clone and safe to send across worker threads.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmdpipeError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CmdpipeError>;

/// A fault raised while executing a command.
#[derive(Error, Debug, Clone)]
pub enum CommandError {
    #[error("{0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(Arc<std::io::Error>),

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("command '{program}' timed out after {timeout:?}")]
    Timeout { program: String, timeout: Duration },

    #[error("command exited with status {code}: {stderr}")]
    NonZeroExit { code: i32, stderr: String },

    #[error("command panicked: {0}")]
    Panicked(String),

    #[error("worker pool error: {0}")]
    Pool(String),

    #[error("{0:#}")]
    Other(Arc<anyhow::Error>),
}

impl CommandError {
    /// Convenience constructor for ad-hoc faults raised by leaf commands.
    pub fn failed(msg: impl Into<String>) -> Self {
        CommandError::Failed(msg.into())
    }
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::Io(Arc::new(err))
    }
}

impl From<anyhow::Error> for CommandError {
    fn from(err: anyhow::Error) -> Self {
        CommandError::Other(Arc::new(err))
    }
}
