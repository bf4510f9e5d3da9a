//! HTTP service implementation.
//!
//! This module translates inbound HTTP requests into calls on the identifier
//! allocator, the job container and the shutdown coordinator, and maps their
//! results onto status codes.
//!
//! ## Structure
//!
//! - [`handler`] - Shared service state (`HashService`), routes and handlers.
//! - [`error`] - Mapping from core errors to HTTP responses.

pub mod error;
pub mod handler;
