/// A one-way password transform with a fixed, deliberately expensive cost.
///
/// Implementations are blocking and CPU bound. The job container runs them on
/// the blocking thread pool so a hash never stalls the dispatch loop or other
/// workers.
///
/// Failures are returned as a [`HashError`] and captured in the job's outcome
/// rather than propagated.
pub trait PasswordHasher: Send + Sync + 'static {
    /// Hashes `payload`, returning the encoded hash.
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if the underlying primitive fails.
    fn hash(&self, payload: &str) -> Result<String, HashError>;

    /// Checks `payload` against a hash previously produced by [`Self::hash`].
    ///
    /// # Errors
    ///
    /// Returns a [`HashError`] if `hash` is malformed.
    fn verify(&self, payload: &str, hash: &str) -> Result<bool, HashError>;
}

/// A captured hash failure.
///
/// Stored inside [`JobOutcome::Failed`] so the reader of a job can tell a
/// failed hash apart from a job that does not exist yet.
///
/// [`JobOutcome::Failed`]: crate::JobOutcome::Failed
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("hash failed: {reason}")]
pub struct HashError {
    reason: String,
}

impl HashError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
