//! # `hashpipe-server`: HTTP front end for the hashpipe job queue
//!
//! Exposes a [`hashpipe::JobContainer`] over four HTTP operations:
//!
//! - `POST /hash` with form field `password`: queues a bcrypt hash and
//!   returns its identifier with `202 Accepted`.
//! - `GET /hash/{id}`: returns the hash once the job has completed, `404`
//!   while it is unknown or still in flight, `500` if hashing failed.
//! - `GET /stats`: returns `{"Total": n, "Average": ns}`.
//! - `POST /shutdown`: stops accepting work and drains outstanding jobs.
//!
//! ## Module Overview
//!
//! - [`server::config`] - CLI/environment configuration.
//! - [`server::service`] - HTTP handlers and shared service state.
//! - [`server::telemetry`] - Structured logging setup.

pub mod server;
