//! Routes and handlers for the hashing service.
//!
//! [`HashService`] bundles the identifier allocator, the job container and the
//! shutdown coordinator. It is cloned into every request via axum state.
//!
//! ## Responsibilities
//!
//! - Admit submissions through the coordinator, assign an identifier and hand
//!   the job to the container.
//! - Report a job's outcome as one of three distinct results: hashed, failed
//!   or not found.
//! - Serve the statistics snapshot.
//! - Trigger the drain on `POST /shutdown`.

use super::error::ApiError;
use axum::{
    Form, Json, Router,
    extract::{
        Path, Query, State,
        rejection::{FormRejection, QueryRejection},
    },
    http::StatusCode,
    routing::{get, post},
};
use core::time::Duration;
use hashpipe::{
    ContainerConfig, Error, IdAllocator, Job, JobContainer, JobOutcome, PasswordHasher,
    ShutdownCoordinator, Stats,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared state behind every route.
pub struct HashService<H> {
    ids: Arc<IdAllocator>,
    container: Arc<JobContainer<H>>,
    coordinator: Arc<ShutdownCoordinator<H>>,
}

impl<H> Clone for HashService<H> {
    fn clone(&self) -> Self {
        Self {
            ids: Arc::clone(&self.ids),
            container: Arc::clone(&self.container),
            coordinator: Arc::clone(&self.coordinator),
        }
    }
}

impl<H> HashService<H>
where
    H: PasswordHasher,
{
    /// Creates the service and starts the container's dispatch loop.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Propagates a failure to start the container.
    pub fn new(
        hasher: H,
        id_seed: u64,
        config: ContainerConfig,
        drain_timeout: Duration,
    ) -> hashpipe::Result<Self> {
        let container = Arc::new(JobContainer::new(hasher, config));
        container.start()?;
        let coordinator = Arc::new(ShutdownCoordinator::new(
            Arc::clone(&container),
            drain_timeout,
        ));

        Ok(Self {
            ids: Arc::new(IdAllocator::new(id_seed)),
            container,
            coordinator,
        })
    }

    pub fn container(&self) -> &JobContainer<H> {
        &self.container
    }

    pub fn coordinator(&self) -> &ShutdownCoordinator<H> {
        &self.coordinator
    }

    /// Begins the drain. Returns `false` if it had already begun.
    pub async fn shutdown(&self) -> bool {
        self.coordinator.begin_shutdown().await
    }

    /// Waits until every outstanding job has stored its result.
    pub async fn wait(&self) {
        self.coordinator.wait().await;
    }

    /// Admits, identifies and enqueues one payload.
    async fn submit(&self, payload: String) -> Result<u64, Error> {
        let _guard = self.coordinator.try_enter()?;
        let id = self.ids.next_id();
        self.container.submit(Job::new(id, payload)).await?;
        Ok(id)
    }
}

/// Builds the router for a [`HashService`].
pub fn router<H>(service: HashService<H>) -> Router
where
    H: PasswordHasher,
{
    Router::new()
        .route("/hash", post(submit_hash::<H>))
        .route("/hash/{id}", get(get_hash::<H>))
        .route("/stats", get(get_stats::<H>))
        .route("/shutdown", post(shutdown::<H>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub struct HashForm {
    pub password: Option<String>,
}

/// `POST /hash`: queues the password and answers `202` with its identifier.
///
/// The password is read from a urlencoded body, falling back to the query
/// string. The body wins when both carry it. A request with neither, or whose
/// body or query does not parse as a form, hashes the empty string.
async fn submit_hash<H>(
    State(service): State<HashService<H>>,
    query: Result<Query<HashForm>, QueryRejection>,
    form: Result<Form<HashForm>, FormRejection>,
) -> Result<(StatusCode, String), ApiError>
where
    H: PasswordHasher,
{
    let password = form
        .ok()
        .and_then(|Form(form)| form.password)
        .or_else(|| query.ok().and_then(|Query(query)| query.password))
        .unwrap_or_default();

    let id = service.submit(password).await?;
    tracing::debug!("Accepted job {id}");
    Ok((StatusCode::ACCEPTED, id.to_string()))
}

/// `GET /hash/{id}`: `200` with the hash, `500` if hashing failed, `404`
/// otherwise.
async fn get_hash<H>(
    State(service): State<HashService<H>>,
    Path(raw_id): Path<String>,
) -> Result<(StatusCode, String), ApiError>
where
    H: PasswordHasher,
{
    // Only plain decimal digits name an issued id; `parse` alone would also
    // take a leading `+`.
    let id = raw_id
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| raw_id.parse::<u64>().ok())
        .flatten();
    let Some(id) = id else {
        return Ok((StatusCode::NOT_FOUND, format!("ID '{raw_id}' not found")));
    };

    match service.container.get_result(id)? {
        JobOutcome::Hashed(hash) => Ok((StatusCode::OK, hash)),
        JobOutcome::Failed(e) => Ok((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// `GET /stats`: the current `{Total, Average}` snapshot as JSON.
async fn get_stats<H>(State(service): State<HashService<H>>) -> Json<Stats>
where
    H: PasswordHasher,
{
    Json(service.container.stats())
}

/// `POST /shutdown`: begins the drain. Repeat calls succeed without further
/// effect.
async fn shutdown<H>(State(service): State<HashService<H>>) -> StatusCode
where
    H: PasswordHasher,
{
    if service.shutdown().await {
        tracing::info!("Shutdown requested via HTTP");
    }
    StatusCode::OK
}
