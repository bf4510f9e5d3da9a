//! Drain-to-completion shutdown.
//!
//! The [`ShutdownCoordinator`] sequences the stop of a [`JobContainer`] so that
//! no submission can race the close of its intake, and no worker is abandoned
//! mid-hash.
//!
//! ## States
//!
//! - `Running`: submissions are admitted through [`ShutdownCoordinator::try_enter`].
//! - `Draining`: new submissions are refused, the transport token is cancelled
//!   and intake is closed once admitted submissions finish.
//! - `Stopped`: every worker has stored its result.
//!
//! ## Ordering
//!
//! [`ShutdownCoordinator::begin_shutdown`] refuses new submissions *before* it
//! closes intake, and waits for already-admitted submissions in between. The
//! reverse order would let a late submission hit a closed intake.

use crate::{Error, JobContainer, PasswordHasher, Result};
use core::time::Duration;
use portable_atomic::{AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

/// Lifecycle of a [`ShutdownCoordinator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ShutdownState {
    Running = 0,
    Draining = 1,
    Stopped = 2,
}

impl ShutdownState {
    const fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Running,
            1 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// Sequences shutdown of the transport and a [`JobContainer`].
pub struct ShutdownCoordinator<H> {
    container: Arc<JobContainer<H>>,
    state: AtomicU8,
    inflight: AtomicUsize,
    transport: CancellationToken,
    intake_closed: CancellationToken,
    drain_timeout: Duration,
}

impl<H> ShutdownCoordinator<H>
where
    H: PasswordHasher,
{
    /// Default bound on how long [`Self::begin_shutdown`] waits for admitted
    /// submissions before closing intake anyway.
    pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

    pub fn new(container: Arc<JobContainer<H>>, drain_timeout: Duration) -> Self {
        Self {
            container,
            state: AtomicU8::new(ShutdownState::Running as u8),
            inflight: AtomicUsize::new(0),
            transport: CancellationToken::new(),
            intake_closed: CancellationToken::new(),
            drain_timeout,
        }
    }

    pub fn state(&self) -> ShutdownState {
        ShutdownState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Token cancelled when the transport must stop accepting requests.
    pub fn transport_token(&self) -> CancellationToken {
        self.transport.clone()
    }

    /// Number of admitted submissions that have not finished yet.
    pub fn submissions_inflight(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    /// Admits one submission.
    ///
    /// Hold the returned guard for as long as the submission is in progress,
    /// including the call to [`JobContainer::submit`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::ServiceShutdown`] once shutdown has begun.
    pub fn try_enter(&self) -> Result<SubmissionGuard<'_>> {
        // Count first, then check: `begin_shutdown` flips the state first and
        // then reads the count, so one of the two always sees the other.
        self.inflight.fetch_add(1, Ordering::SeqCst);
        if self.state() != ShutdownState::Running {
            self.inflight.fetch_sub(1, Ordering::SeqCst);
            return Err(Error::ServiceShutdown);
        }
        Ok(SubmissionGuard {
            inflight: &self.inflight,
        })
    }

    /// Moves from `Running` to `Draining`.
    ///
    /// - Refuses new submissions.
    /// - Cancels the transport token.
    /// - Waits up to the drain timeout for admitted submissions.
    /// - Closes the container's intake.
    ///
    /// Returns `false` without doing anything if shutdown had already begun.
    pub async fn begin_shutdown(&self) -> bool {
        if self
            .state
            .compare_exchange(
                ShutdownState::Running as u8,
                ShutdownState::Draining as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_err()
        {
            tracing::debug!("Shutdown already in progress");
            return false;
        }

        tracing::info!("Refusing new submissions");
        self.transport.cancel();

        tracing::info!(
            "Draining in-flight submissions ({} active)",
            self.submissions_inflight()
        );
        let drained = timeout(self.drain_timeout, async {
            while self.submissions_inflight() > 0 {
                sleep(Duration::from_millis(10)).await;
            }
        })
        .await;

        if drained.is_err() {
            tracing::warn!(
                "Submission drain timed out ({} still active); closing intake anyway",
                self.submissions_inflight()
            );
        }

        self.container.stop();
        self.intake_closed.cancel();
        true
    }

    /// Waits for shutdown to complete.
    ///
    /// Resolves once intake has been closed by [`Self::begin_shutdown`] and
    /// every worker has stored its result, then moves to `Stopped`. There is
    /// no deadline: a worker is never abandoned mid-hash.
    pub async fn wait(&self) {
        self.intake_closed.cancelled().await;

        tracing::info!(
            "Waiting for {} outstanding task(s) to finish",
            self.container.active_tasks()
        );
        self.container.wait().await;

        self.state
            .store(ShutdownState::Stopped as u8, Ordering::SeqCst);
        tracing::info!("All workers finished");
    }
}

/// Marks one admitted submission; released on drop.
#[must_use = "the submission is only counted while the guard is held"]
pub struct SubmissionGuard<'a> {
    inflight: &'a AtomicUsize,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        self.inflight.fetch_sub(1, Ordering::SeqCst);
    }
}
