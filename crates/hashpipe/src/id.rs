use portable_atomic::{AtomicU64, Ordering};

/// A lock-free, monotonically increasing identifier allocator.
///
/// The allocator stores the last issued identifier in an [`AtomicU64`] and
/// advances it with a single fetch-add per call, so it can be shared across
/// threads (typically behind an `Arc`) without any locking.
///
/// ## Guarantees
/// - The first call to [`IdAllocator::next_id`] returns `seed + 1`.
/// - Every call returns a value strictly greater than all values previously
///   returned, in issuance order.
/// - Under any interleaving of `C` concurrent callers, the issued set is
///   exactly `{seed + 1, ..., seed + C}`.
///
/// ## Caveats
/// The counter wraps past [`u64::MAX`]. At one identifier per nanosecond that
/// takes several centuries, so it is not handled.
///
/// # Example
/// ```
/// use hashpipe::IdAllocator;
///
/// let ids = IdAllocator::new(10);
/// assert_eq!(ids.next_id(), 11);
/// assert_eq!(ids.next_id(), 12);
/// assert_eq!(ids.last_id(), 12);
/// ```
#[derive(Debug, Default)]
pub struct IdAllocator {
    last: AtomicU64,
}

impl IdAllocator {
    /// Creates a new allocator whose first identifier is `seed + 1`.
    pub const fn new(seed: u64) -> Self {
        Self {
            last: AtomicU64::new(seed),
        }
    }

    /// Issues the next identifier.
    ///
    /// A relaxed read-modify-write is enough: every fetch-add observes the
    /// latest value in the counter's modification order, so no two callers can
    /// receive the same identifier.
    pub fn next_id(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Returns the most recently issued identifier, or the seed if none has
    /// been issued.
    pub fn last_id(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};
    use std::thread::scope;

    #[test]
    fn first_id_follows_zero_seed() {
        let ids = IdAllocator::new(0);
        assert_eq!(ids.last_id(), 0);
        assert_eq!(ids.next_id(), 1);
    }

    #[test]
    fn first_id_follows_non_zero_seed() {
        let ids = IdAllocator::new(10);
        assert_eq!(ids.next_id(), 11);
        assert_eq!(ids.next_id(), 12);
        assert_eq!(ids.last_id(), 12);
    }

    #[test]
    fn ids_strictly_increase() {
        let ids = IdAllocator::default();
        let mut last = 0;
        for _ in 0..1024 {
            let id = ids.next_id();
            assert!(id > last);
            last = id;
        }
    }

    #[test]
    fn concurrent_callers_receive_every_id_exactly_once() {
        const THREADS: usize = 8;
        const IDS_PER_THREAD: usize = 512;
        const SEED: u64 = 100;

        let ids = Arc::new(IdAllocator::new(SEED));
        let seen = Arc::new(Mutex::new(HashSet::with_capacity(THREADS * IDS_PER_THREAD)));

        scope(|s| {
            for _ in 0..THREADS {
                let ids = Arc::clone(&ids);
                let seen = Arc::clone(&seen);

                s.spawn(move || {
                    for _ in 0..IDS_PER_THREAD {
                        let id = ids.next_id();
                        assert!(seen.lock().unwrap().insert(id), "duplicate id {id}");
                    }
                });
            }
        });

        let seen = seen.lock().unwrap();
        let total = (THREADS * IDS_PER_THREAD) as u64;
        let expected: HashSet<u64> = (SEED + 1..=SEED + total).collect();
        assert_eq!(*seen, expected);
        assert_eq!(ids.last_id(), SEED + total);
    }
}
