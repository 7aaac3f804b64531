// src/command/result.rs

//! The normalized outcome of one command execution.

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::errors::CommandError;

/// Outcome of running a [`Command`](super::Command).
///
/// - `output`: the produced value (absent on failure unless a partial value is
///   meaningful).
/// - `succeeded`: whether the command reached its goal.
/// - `error`: the fault that caused the failure, if one was raised.
/// - `error_message`: human readable description of the failure.
/// - `metadata`: side-channel data that is not part of the logical output
///   (e.g. exit code and stderr of a subprocess).
///
/// A *soft failure* has `succeeded == false` and an `error_message`, but no
/// `error`.
#[derive(Debug, Clone, Serialize)]
pub struct CommandResult {
    pub output: Option<Value>,
    pub succeeded: bool,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<CommandError>,
    pub error_message: Option<String>,
    pub metadata: Option<Value>,
}

impl CommandResult {
    /// Successful result carrying `output`.
    pub fn new(output: Option<Value>) -> Self {
        Self {
            output,
            succeeded: true,
            error: None,
            error_message: None,
            metadata: None,
        }
    }

    /// Successful result from anything convertible into a JSON value.
    pub fn ok(output: impl Into<Value>) -> Self {
        Self::new(Some(output.into()))
    }

    /// Expected, recoverable failure without a fault object.
    pub fn soft_failure(message: impl Into<String>) -> Self {
        Self {
            output: None,
            succeeded: false,
            error: None,
            error_message: Some(message.into()),
            metadata: None,
        }
    }

    /// Failing result recorded for a raised fault.
    pub fn from_error(error: &CommandError) -> Self {
        Self {
            output: None,
            succeeded: false,
            error_message: Some(error.to_string()),
            error: Some(error.clone()),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// `output` as JSON, with `null` standing in for an absent value.
    pub fn output_or_null(&self) -> Value {
        self.output.clone().unwrap_or(Value::Null)
    }

    pub fn output_str(&self) -> Option<&str> {
        self.output.as_ref().and_then(Value::as_str)
    }
}

fn serialize_error<S>(error: &Option<CommandError>, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match error {
        Some(e) => s.serialize_some(&e.to_string()),
        None => s.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn directly_constructed_result_defaults_to_success() {
        let r = CommandResult::new(None);
        assert!(r.succeeded);
        assert!(r.error.is_none());
        assert!(r.error_message.is_none());
    }

    #[test]
    fn soft_failure_has_message_but_no_fault() {
        let r = CommandResult::soft_failure("not found");
        assert!(!r.succeeded);
        assert!(r.error.is_none());
        assert_eq!(r.error_message.as_deref(), Some("not found"));
    }

    #[test]
    fn fault_result_sets_all_failure_fields() {
        let r = CommandResult::from_error(&CommandError::failed("boom"));
        assert!(!r.succeeded);
        assert!(r.output.is_none());
        assert!(matches!(r.error, Some(CommandError::Failed(_))));
        assert_eq!(r.error_message.as_deref(), Some("boom"));
    }

    #[test]
    fn serializes_error_as_message() {
        let r = CommandResult::from_error(&CommandError::failed("boom"));
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["error"], json!("boom"));
        assert_eq!(v["succeeded"], json!(false));
        assert_eq!(v["output"], Value::Null);
    }
}
