// src/composite/pool.rs

//! Bounded worker pool used by [`ParallelCommand`].
//!
//! Each batch gets its own multi-thread tokio runtime. Jobs run on the
//! runtime's blocking pool via `spawn_blocking`, capped at `size` threads and
//! gated by a [`Semaphore`], so at most `size` jobs are in flight. Workers
//! share no mutable state with the coordinator: a job owns its snapshot and
//! hands it back, executed, in its [`JobOutcome`].
//!
//! [`WorkerPool::run_all`] returns only after every submitted job has been
//! joined.
//!
//! [`ParallelCommand`]: super::ParallelCommand

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use tokio::runtime::{Builder, Runtime};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, trace};

use crate::command::{BoxedCommand, CommandResult};
use crate::errors::CommandError;

/// One unit of work for a worker: an isolated snapshot of a child command.
#[derive(Debug)]
pub struct Job {
    /// Submission index; results are written back by this index.
    pub index: usize,
    pub command: BoxedCommand,
    pub raise_error: bool,
}

/// What comes back for a finished job.
#[derive(Debug)]
pub struct JobOutcome {
    pub index: usize,
    pub result: CommandResult,
    /// The executed snapshot, including everything recorded in its subtree.
    /// `None` when the job panicked and the snapshot was lost.
    pub command: Option<BoxedCommand>,
}

#[derive(Debug, Clone, Copy)]
pub struct WorkerPool {
    size: usize,
}

/// Number of available processing units on this host (at least 1).
pub fn default_pool_size() -> usize {
    thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

impl WorkerPool {
    /// `size` is clamped to at least one worker.
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Execute every job and return the outcomes in submission order.
    ///
    /// Individual command faults and panics never fail the batch; they come
    /// back as failing results. `Err` is only returned when the pool itself
    /// breaks (the runtime could not be built or a job went missing).
    ///
    /// Must not be called from inside an async task.
    pub fn run_all(&self, jobs: Vec<Job>) -> Result<Vec<JobOutcome>, CommandError> {
        let total = jobs.len();
        if total == 0 {
            return Ok(Vec::new());
        }

        let workers = self.size.min(total);
        debug!(jobs = total, workers, "starting worker pool");

        let runtime = build_runtime(workers)?;
        let mut slots: Vec<Option<JobOutcome>> = (0..total).map(|_| None).collect();

        runtime.block_on(async {
            let permits = Arc::new(Semaphore::new(workers));
            let mut set = JoinSet::new();
            let mut indices = HashMap::with_capacity(total);

            for job in jobs {
                let permit = Arc::clone(&permits)
                    .acquire_owned()
                    .await
                    .map_err(|e| CommandError::Pool(format!("acquiring worker slot: {e}")))?;
                let index = job.index;
                let handle = set.spawn_blocking(move || {
                    let _permit = permit;
                    run_job(job)
                });
                indices.insert(handle.id(), index);
            }

            while let Some(joined) = set.join_next_with_id().await {
                let outcome = match joined {
                    Ok((_, outcome)) => outcome,
                    Err(err) => {
                        let index = indices.get(&err.id()).copied().ok_or_else(|| {
                            CommandError::Pool(format!("unknown task {} finished", err.id()))
                        })?;
                        lost_job(index, err)
                    }
                };

                trace!(index = outcome.index, "job reported");
                let index = outcome.index;
                slots[index] = Some(outcome);
            }

            Ok::<(), CommandError>(())
        })?;

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| CommandError::Pool(format!("no result reported for job {index}")))
            })
            .collect()
    }
}

/// Runtime whose blocking pool provides the `workers` worker threads.
fn build_runtime(workers: usize) -> Result<Runtime, CommandError> {
    let next_id = AtomicUsize::new(0);
    Builder::new_multi_thread()
        .worker_threads(1)
        .max_blocking_threads(workers)
        .thread_name_fn(move || {
            format!("cmdpipe-worker-{}", next_id.fetch_add(1, Ordering::Relaxed))
        })
        .enable_all()
        .build()
        .map_err(|e| CommandError::Pool(format!("building worker runtime: {e}")))
}

/// Run one snapshot to completion; a strict fault becomes its recorded result.
fn run_job(job: Job) -> JobOutcome {
    let Job {
        index,
        mut command,
        raise_error,
    } = job;

    let result = match command.run_with(None, raise_error) {
        Ok(result) => result,
        Err(fault) => {
            debug!(index, command = command.name(), error = %fault, "strict fault contained by worker");
            command
                .result()
                .cloned()
                .unwrap_or_else(|| CommandResult::from_error(&fault))
        }
    };

    JobOutcome {
        index,
        result,
        command: Some(command),
    }
}

/// Outcome for a job whose task did not return (it panicked).
fn lost_job(index: usize, err: JoinError) -> JobOutcome {
    let fault = if err.is_panic() {
        error!(index, error = %err, "command panicked in worker");
        CommandError::Panicked(err.to_string())
    } else {
        error!(index, error = %err, "worker task did not complete");
        CommandError::Pool(err.to_string())
    };

    JobOutcome {
        index,
        result: CommandResult::from_error(&fault),
        command: None,
    }
}
