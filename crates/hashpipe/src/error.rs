//! Error types for the hashing job queue.
//!
//! This module defines the central `Error` enum returned by the
//! [`JobContainer`] and [`ShutdownCoordinator`] APIs.
//!
//! ## Error Cases
//! - `NotFound`: The identifier is unknown or its job has not completed yet.
//!   The two cases are intentionally indistinguishable.
//! - `IntakeClosed`: A job was submitted after intake was stopped. This is a
//!   sequencing defect in the caller, not a normal runtime condition.
//! - `NotStarted`: A job was submitted before intake was started.
//! - `AlreadyStarted`: Intake was started twice.
//! - `ServiceShutdown`: A submission arrived after shutdown began and was
//!   refused before reaching the container.
//!
//! Hash failures are not part of this enum. They are captured per job as a
//! [`HashError`] inside the stored [`JobOutcome`] and never propagated.
//!
//! [`JobContainer`]: crate::JobContainer
//! [`ShutdownCoordinator`]: crate::ShutdownCoordinator
//! [`HashError`]: crate::HashError
//! [`JobOutcome`]: crate::JobOutcome

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the hashing job queue.
#[derive(Clone, thiserror::Error, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// No result is stored for the identifier (yet).
    #[error("ID '{id}' not found")]
    NotFound { id: u64 },

    /// Intake was already closed when the job was submitted.
    #[error("Intake closed: job {id} submitted after stop")]
    IntakeClosed { id: u64 },

    /// The dispatch loop has not been started.
    #[error("Intake not started: call start() before submitting work")]
    NotStarted,

    /// The dispatch loop is already running.
    #[error("Intake already started")]
    AlreadyStarted,

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}
