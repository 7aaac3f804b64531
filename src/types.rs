// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::CmdpipeError;

/// Continuation policy between the children of a sequential command,
/// mirroring the shell control operators.
///
/// - `And` (`&&`, default): stop after the first child that fails.
/// - `Or` (`||`): stop after the first child that succeeds.
/// - `Always` (`;`): run every child regardless of outcome.
///
/// `SequentialCommand` stores an `Option<Operator>` where `None` also means
/// "always"; both spellings behave the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum Operator {
    #[default]
    #[serde(rename = "&&", alias = "and")]
    And,
    #[serde(rename = "||", alias = "or")]
    Or,
    #[serde(rename = ";", alias = "always")]
    Always,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "&&",
            Operator::Or => "||",
            Operator::Always => ";",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operator {
    type Err = CmdpipeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "&&" | "and" => Ok(Operator::And),
            "||" | "or" => Ok(Operator::Or),
            ";" | "always" => Ok(Operator::Always),
            other => Err(CmdpipeError::ConfigError(format!(
                "invalid operator: {other} (expected \"&&\", \"||\" or \";\")"
            ))),
        }
    }
}

/// Parse an optional operator string; `None` selects "always".
pub fn parse_operator(s: Option<&str>) -> Result<Option<Operator>, CmdpipeError> {
    s.map(str::parse).transpose()
}
