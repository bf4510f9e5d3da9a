//! Concurrent job container.
//!
//! The [`JobContainer`] owns the intake channel, the dispatch loop, the
//! per-job workers, the result store and the latency statistics.
//!
//! ## Lifecycle
//!
//! 1. [`JobContainer::start`] spawns the dispatch loop.
//! 2. [`JobContainer::submit`] hands jobs to the loop, one rendezvous per job.
//!    The loop spawns a worker per job and goes straight back to receiving.
//! 3. [`JobContainer::stop`] closes intake. Later submissions fail with
//!    [`Error::IntakeClosed`].
//! 4. [`JobContainer::wait`] blocks until the loop has drained and every
//!    worker has stored its result.
//!
//! Results become visible as workers finish, in no particular order. Readers
//! must tolerate [`Error::NotFound`] for a job that is still in flight.

mod dispatch;
mod job;
mod stats;
mod store;

pub use job::*;
pub use stats::*;

use crate::{Error, PasswordHasher, Result};
use core::{num::NonZeroUsize, time::Duration};
use dispatch::{Intake, WorkerContext, dispatch_loop};
use parking_lot::Mutex;
use std::sync::Arc;
use store::ResultStore;
use tokio::sync::{Semaphore, mpsc, oneshot};
use tokio_util::task::TaskTracker;

/// Tuning knobs for a [`JobContainer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Artificial delay each worker waits before hashing.
    pub hash_delay: Duration,
    /// Upper bound on concurrently running workers. `None` spawns one worker
    /// per job with no bound.
    pub max_workers: Option<NonZeroUsize>,
}

impl ContainerConfig {
    pub const DEFAULT_HASH_DELAY: Duration = Duration::from_secs(5);
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            hash_delay: Self::DEFAULT_HASH_DELAY,
            max_workers: None,
        }
    }
}

enum IntakeState {
    Idle,
    Open(mpsc::Sender<Intake>),
    Closed,
}

/// Asynchronous hashing job container.
///
/// Must be used from within a Tokio runtime: [`JobContainer::start`] spawns the
/// dispatch loop and workers run their hashes on the blocking pool.
pub struct JobContainer<H> {
    hasher: Arc<H>,
    store: Arc<ResultStore>,
    intake: Mutex<IntakeState>,
    tracker: TaskTracker,
    config: ContainerConfig,
}

impl<H> JobContainer<H>
where
    H: PasswordHasher,
{
    pub fn new(hasher: H, config: ContainerConfig) -> Self {
        Self {
            hasher: Arc::new(hasher),
            store: Arc::new(ResultStore::default()),
            intake: Mutex::new(IntakeState::Idle),
            tracker: TaskTracker::new(),
            config,
        }
    }

    /// Starts accepting jobs by spawning the dispatch loop.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyStarted`] if the loop is running or has already
    /// been stopped; a container cannot be restarted.
    pub fn start(&self) -> Result<()> {
        let mut intake = self.intake.lock();
        match *intake {
            IntakeState::Idle => {}
            IntakeState::Open(_) | IntakeState::Closed => return Err(Error::AlreadyStarted),
        }

        // One slot plus the acknowledgement in `Intake` gives rendezvous
        // semantics; nothing queues up behind a busy loop.
        let (tx, rx) = mpsc::channel(1);
        let ctx = WorkerContext {
            hasher: Arc::clone(&self.hasher),
            store: Arc::clone(&self.store),
            hash_delay: self.config.hash_delay,
        };
        let limit = self
            .config
            .max_workers
            .map(|n| Arc::new(Semaphore::new(n.get())));

        self.tracker
            .spawn(dispatch_loop(rx, ctx, self.tracker.clone(), limit));
        *intake = IntakeState::Open(tx);

        tracing::info!(
            "Accepting work (hash delay {:?}, max workers {})",
            self.config.hash_delay,
            self.config
                .max_workers
                .map_or_else(|| "unbounded".to_string(), |n| n.to_string())
        );
        Ok(())
    }

    /// Hands `job` to the dispatch loop.
    ///
    /// Suspends until the loop has received the job. Processing happens
    /// asynchronously; poll [`Self::get_result`] for the outcome.
    ///
    /// # Errors
    ///
    /// - [`Error::NotStarted`] if [`Self::start`] has not been called.
    /// - [`Error::IntakeClosed`] if [`Self::stop`] has already closed intake.
    ///   Callers are expected to stop submitting before stopping the
    ///   container, so this indicates a sequencing defect and is logged as
    ///   such.
    pub async fn submit(&self, job: Job) -> Result<()> {
        let id = job.id;
        let tx = match &*self.intake.lock() {
            IntakeState::Open(tx) => tx.clone(),
            IntakeState::Idle => return Err(Error::NotStarted),
            IntakeState::Closed => return Err(intake_closed(id)),
        };

        let (accepted, ack) = oneshot::channel();
        tx.send(Intake { job, accepted })
            .await
            .map_err(|_| intake_closed(id))?;
        ack.await.map_err(|_| intake_closed(id))
    }

    /// Closes intake.
    ///
    /// The dispatch loop finishes receiving whatever submissions were already
    /// in progress and then exits. Calling this more than once has no further
    /// effect.
    pub fn stop(&self) {
        let previous = core::mem::replace(&mut *self.intake.lock(), IntakeState::Closed);
        match previous {
            IntakeState::Open(_) => tracing::info!("Intake closed"),
            IntakeState::Idle => tracing::info!("Intake closed before it was started"),
            IntakeState::Closed => tracing::debug!("Intake already closed"),
        }
    }

    /// Waits until the dispatch loop has drained and every worker has stored
    /// its result.
    ///
    /// Only resolves after [`Self::stop`]; while intake is open the dispatch
    /// loop keeps running.
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    /// Returns `true` once intake has been closed.
    pub fn is_stopped(&self) -> bool {
        matches!(*self.intake.lock(), IntakeState::Closed)
    }

    /// Number of live tasks: the dispatch loop plus running workers.
    pub fn active_tasks(&self) -> usize {
        self.tracker.len()
    }

    /// Stores the outcome for `id`, overwriting any previous entry.
    pub fn set_result(&self, id: u64, outcome: JobOutcome) {
        self.store.set_result(id, outcome);
    }

    /// Looks up the outcome for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if `id` was never submitted or its job has
    /// not completed yet.
    pub fn get_result(&self, id: u64) -> Result<JobOutcome> {
        self.store.get_result(id)
    }

    /// Folds a completed job's duration into the statistics.
    pub fn record_duration(&self, elapsed: Duration) {
        self.store.record_duration(elapsed);
    }

    /// Returns a consistent snapshot of the statistics.
    pub fn stats(&self) -> Stats {
        self.store.stats()
    }

    /// Number of stored outcomes.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }
}

fn intake_closed(id: u64) -> Error {
    tracing::error!("Job {id} submitted after intake was closed");
    Error::IntakeClosed { id }
}
