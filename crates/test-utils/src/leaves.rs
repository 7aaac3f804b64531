#![allow(dead_code)]

//! Small leaf commands for exercising the composites in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use cmdpipe::{BoxedCommand, Command, CommandError, CommandResult, CommandState, Invocation};
use serde_json::Value;

/// Appends one character to its string input (absent input counts as `""`).
#[derive(Debug, Clone)]
pub struct AppendChar {
    state: CommandState,
    ch: char,
}

impl AppendChar {
    pub fn new(ch: char) -> Self {
        Self {
            state: CommandState::new(),
            ch,
        }
    }
}

impl Command for AppendChar {
    fn state(&self) -> &CommandState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }

    fn execute(&mut self, inv: &Invocation) -> Result<CommandResult, CommandError> {
        let prefix = inv.input.as_ref().and_then(Value::as_str).unwrap_or("");
        Ok(CommandResult::ok(format!("{prefix}{}", self.ch)))
    }
}

/// Soft failure normally; raises the same message when run strictly.
#[derive(Debug, Clone)]
pub struct SoftFail {
    state: CommandState,
}

impl SoftFail {
    pub const MESSAGE: &'static str = "Error from SoftFail";

    pub fn new() -> Self {
        Self {
            state: CommandState::new(),
        }
    }

    pub fn strict() -> Self {
        Self {
            state: CommandState::new().with_raise_error(true),
        }
    }
}

impl Default for SoftFail {
    fn default() -> Self {
        Self::new()
    }
}

impl Command for SoftFail {
    fn state(&self) -> &CommandState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }

    fn execute(&mut self, inv: &Invocation) -> Result<CommandResult, CommandError> {
        if inv.raise_error {
            return Err(CommandError::failed(Self::MESSAGE));
        }
        Ok(CommandResult::soft_failure(Self::MESSAGE))
    }
}

/// Raises a fault on every run.
#[derive(Debug, Clone, Default)]
pub struct AlwaysFault {
    state: CommandState,
}

impl AlwaysFault {
    pub const MESSAGE: &'static str = "Error from AlwaysFault";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            state: CommandState::new().with_raise_error(true),
        }
    }
}

impl Command for AlwaysFault {
    fn state(&self) -> &CommandState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }

    fn execute(&mut self, _inv: &Invocation) -> Result<CommandResult, CommandError> {
        Err(CommandError::failed(Self::MESSAGE))
    }
}

/// Panics on every run.
#[derive(Debug, Clone, Default)]
pub struct Panicking {
    state: CommandState,
}

impl Command for Panicking {
    fn state(&self) -> &CommandState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }

    fn execute(&mut self, _inv: &Invocation) -> Result<CommandResult, CommandError> {
        panic!("Panicking command was run");
    }
}

/// Outputs the name of the thread it ran on.
#[derive(Debug, Clone, Default)]
pub struct ThreadName {
    state: CommandState,
}

impl Command for ThreadName {
    fn state(&self) -> &CommandState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }

    fn execute(&mut self, _inv: &Invocation) -> Result<CommandResult, CommandError> {
        let current = std::thread::current();
        let name = current
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{:?}", current.id()));
        Ok(CommandResult::ok(name))
    }
}

/// Counts how often it was executed (across snapshots) and echoes its input.
#[derive(Debug, Clone, Default)]
pub struct Counting {
    state: CommandState,
    calls: Arc<AtomicUsize>,
}

impl Counting {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Shared counter, readable after the command was moved into a tree.
    pub fn counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl Command for Counting {
    fn state(&self) -> &CommandState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }

    fn execute(&mut self, inv: &Invocation) -> Result<CommandResult, CommandError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CommandResult::new(inv.input.clone()))
    }
}

/// Meeting point for [`Rendezvous`] commands.
#[derive(Debug, Default)]
pub struct Meeting {
    arrived: Mutex<usize>,
    cond: Condvar,
}

/// Waits until `expected` rendezvous commands are running at the same time.
///
/// Outputs `true` if everybody arrived before the timeout, `false` otherwise,
/// which makes real concurrency observable without timing assertions.
#[derive(Debug, Clone)]
pub struct Rendezvous {
    state: CommandState,
    meeting: Arc<Meeting>,
    expected: usize,
    timeout: Duration,
}

impl Rendezvous {
    /// `count` commands that all wait for each other.
    pub fn group(count: usize, timeout: Duration) -> Vec<BoxedCommand> {
        let meeting = Arc::new(Meeting::default());
        (0..count)
            .map(|_| {
                Rendezvous {
                    state: CommandState::new(),
                    meeting: Arc::clone(&meeting),
                    expected: count,
                    timeout,
                }
                .boxed()
            })
            .collect()
    }
}

impl Command for Rendezvous {
    fn state(&self) -> &CommandState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut CommandState {
        &mut self.state
    }

    fn execute(&mut self, _inv: &Invocation) -> Result<CommandResult, CommandError> {
        let mut arrived = self
            .meeting
            .arrived
            .lock()
            .map_err(|_| CommandError::failed("rendezvous lock poisoned"))?;
        *arrived += 1;
        self.meeting.cond.notify_all();

        let (arrived, wait) = self
            .meeting
            .cond
            .wait_timeout_while(arrived, self.timeout, |n| *n < self.expected)
            .map_err(|_| CommandError::failed("rendezvous lock poisoned"))?;

        let all_met = !wait.timed_out() || *arrived >= self.expected;
        Ok(CommandResult::ok(all_met))
    }
}

/// `AppendChar` for every character of `chars`, boxed.
pub fn append_chars(chars: &str) -> Vec<BoxedCommand> {
    chars.chars().map(|c| AppendChar::new(c).boxed()).collect()
}
