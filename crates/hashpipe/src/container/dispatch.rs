use super::{Job, JobOutcome, store::ResultStore};
use crate::{HashError, PasswordHasher};
use core::time::Duration;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Semaphore, mpsc, oneshot};
use tokio_util::task::TaskTracker;
use tracing::Instrument;

/// A job in transit from a submitter to the dispatch loop.
///
/// `accepted` is fired as soon as the loop takes the job off the channel, which
/// turns the one-slot channel into a rendezvous: the submitter does not return
/// until the loop has actually received its job.
pub(crate) struct Intake {
    pub(crate) job: Job,
    pub(crate) accepted: oneshot::Sender<()>,
}

/// Everything a worker needs to process one job.
pub(crate) struct WorkerContext<H> {
    pub(crate) hasher: Arc<H>,
    pub(crate) store: Arc<ResultStore>,
    pub(crate) hash_delay: Duration,
}

impl<H> Clone for WorkerContext<H> {
    fn clone(&self) -> Self {
        Self {
            hasher: Arc::clone(&self.hasher),
            store: Arc::clone(&self.store),
            hash_delay: self.hash_delay,
        }
    }
}

/// Single consumer of the intake channel.
///
/// For every received [`Intake`] the loop acknowledges the submitter and spawns
/// one independent worker on `tracker`, then immediately returns to receiving.
/// Jobs are never processed inline. When `limit` is set, the loop waits for a
/// permit before spawning, which bounds the number of live workers and lets
/// the channel apply backpressure to submitters.
///
/// The loop ends once every sender has been dropped and the channel is drained.
pub(crate) async fn dispatch_loop<H>(
    mut rx: mpsc::Receiver<Intake>,
    ctx: WorkerContext<H>,
    tracker: TaskTracker,
    limit: Option<Arc<Semaphore>>,
) where
    H: PasswordHasher,
{
    tracing::debug!("Dispatch loop started");

    while let Some(Intake { job, accepted }) = rx.recv().await {
        // The submitter only goes away if its own future was dropped; the job
        // is still processed.
        let _ = accepted.send(());

        let permit = match &limit {
            Some(semaphore) => Arc::clone(semaphore).acquire_owned().await.ok(),
            None => None,
        };

        let span = tracing::info_span!("job", id = job.id);
        let ctx = ctx.clone();
        tracker.spawn(
            async move {
                run_job(job, ctx).await;
                drop(permit);
            }
            .instrument(span),
        );
    }

    tracing::debug!("Dispatch loop drained");
}

/// Processes a single job from start to stored result.
///
/// The measured duration covers the artificial delay and the hash itself. A
/// hash failure, or a panic inside the hasher, is recorded in the job's
/// outcome and never escapes the worker.
async fn run_job<H>(job: Job, ctx: WorkerContext<H>)
where
    H: PasswordHasher,
{
    let start = Instant::now();

    if !ctx.hash_delay.is_zero() {
        tokio::time::sleep(ctx.hash_delay).await;
    }

    let hasher = Arc::clone(&ctx.hasher);
    let payload = job.payload;
    let outcome = match tokio::task::spawn_blocking(move || hasher.hash(&payload)).await {
        Ok(res) => JobOutcome::from(res),
        Err(e) => JobOutcome::Failed(HashError::new(format!("hash task aborted: {e}"))),
    };

    match &outcome {
        JobOutcome::Hashed(_) => tracing::debug!("Job completed"),
        JobOutcome::Failed(e) => tracing::warn!("Job failed: {e}"),
    }

    ctx.store.complete(job.id, outcome, start.elapsed());
}
