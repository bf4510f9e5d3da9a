use crate::HashError;

/// One unit of requested work.
///
/// Created by the transport when a submission arrives and consumed exactly
/// once by a worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Job {
    pub id: u64,
    pub payload: String,
}

impl Job {
    pub fn new(id: u64, payload: impl Into<String>) -> Self {
        Self {
            id,
            payload: payload.into(),
        }
    }
}

/// The outcome of processing a [`Job`].
///
/// Written exactly once by the worker that processed the job and immutable
/// afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobOutcome {
    /// The payload was hashed successfully.
    Hashed(String),
    /// The hash primitive failed for this job.
    Failed(HashError),
}

impl JobOutcome {
    pub const fn is_hashed(&self) -> bool {
        matches!(self, Self::Hashed(_))
    }

    /// Returns the hash, or the captured failure.
    ///
    /// # Errors
    ///
    /// Returns the [`HashError`] recorded by the worker.
    pub fn into_result(self) -> Result<String, HashError> {
        match self {
            Self::Hashed(hash) => Ok(hash),
            Self::Failed(err) => Err(err),
        }
    }
}

impl From<Result<String, HashError>> for JobOutcome {
    fn from(res: Result<String, HashError>) -> Self {
        match res {
            Ok(hash) => Self::Hashed(hash),
            Err(err) => Self::Failed(err),
        }
    }
}
