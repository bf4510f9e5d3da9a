use core::time::Duration;
use serde::Serialize;

/// Completed-job count and mean processing latency.
///
/// The mean is maintained incrementally from the previous mean and count, so
/// no per-job history is kept. `average` stays at zero until the first job
/// completes.
///
/// Serializes with the field names `Total` and `Average` (nanoseconds).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Stats {
    pub total: u64,
    pub average: u64,
}

impl Stats {
    /// Folds one completed job's duration into the running mean.
    ///
    /// `average <- (average * total + d) / (total + 1)`, with the product held
    /// in 128 bits so it cannot overflow. Durations beyond `u64::MAX`
    /// nanoseconds saturate.
    pub fn record(&mut self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        let sum = u128::from(self.average) * u128::from(self.total) + u128::from(nanos);
        self.total += 1;
        // The mean of u64 samples always fits in a u64.
        self.average = (sum / u128::from(self.total)) as u64;
    }
}
