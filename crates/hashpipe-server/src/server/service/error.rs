//! HTTP mapping for core errors.
//!
//! [`ApiError`] wraps [`hashpipe::Error`] so handlers can return it directly
//! and let axum turn it into a response with an appropriate status code.
//!
//! ## Mapping
//! - `NotFound` -> `404 Not Found` (unknown or still in flight)
//! - `ServiceShutdown` -> `503 Service Unavailable`
//! - `IntakeClosed` -> `503 Service Unavailable` (already logged by the
//!   container as a sequencing defect)
//! - anything else -> `500 Internal Server Error`

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use hashpipe::Error;

#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::ServiceShutdown | Error::IntakeClosed { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.0.to_string()).into_response()
    }
}
