// src/composite/mod.rs

//! Commands implemented purely in terms of other commands.
//!
//! - [`PipeCommand`]: output of each child feeds the next one.
//! - [`SequentialCommand`]: independent children with a `&&` / `||` / `;`
//!   continuation policy.
//! - [`ParallelCommand`]: independent children on a fixed-size worker pool,
//!   with results reconciled back onto the children afterwards.
//!
//! Every composite forwards the strictness of its own invocation to each
//! direct child at the moment that child runs.

pub mod parallel;
pub mod pipe;
pub mod pool;
pub mod sequential;

pub use parallel::ParallelCommand;
pub use pipe::PipeCommand;
pub use pool::{WorkerPool, default_pool_size};
pub use sequential::SequentialCommand;
