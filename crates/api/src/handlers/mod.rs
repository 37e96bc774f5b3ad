//! HTTP handlers, one module per resource.

pub mod members;
pub mod oauth;
pub mod proxy;
pub mod session;

use axum::http::StatusCode;

use crate::error::AppError;

/// OPTIONS on any `/api` route: an empty 200.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Fallback for methods a route does not serve.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
