use super::{JobOutcome, Stats};
use crate::{Error, Result};
use core::time::Duration;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Result store and statistics behind a single exclusive lock.
///
/// Workers only mutate through [`ResultStore::complete`]; readers receive
/// clones or copies, so a stats snapshot is always a consistent
/// `{total, average}` pair that counts every stored result.
#[derive(Debug, Default)]
pub(crate) struct ResultStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    results: HashMap<u64, JobOutcome>,
    stats: Stats,
}

impl ResultStore {
    pub(crate) fn set_result(&self, id: u64, outcome: JobOutcome) {
        self.inner.lock().results.insert(id, outcome);
    }

    /// Stores a finished job's outcome and folds its duration into the
    /// statistics under one lock, so no reader sees one without the other.
    pub(crate) fn complete(&self, id: u64, outcome: JobOutcome, elapsed: Duration) {
        let mut inner = self.inner.lock();
        inner.results.insert(id, outcome);
        inner.stats.record(elapsed);
    }

    pub(crate) fn get_result(&self, id: u64) -> Result<JobOutcome> {
        self.inner
            .lock()
            .results
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound { id })
    }

    pub(crate) fn record_duration(&self, elapsed: Duration) {
        self.inner.lock().stats.record(elapsed);
    }

    pub(crate) fn stats(&self) -> Stats {
        self.inner.lock().stats
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.lock().results.len()
    }
}
