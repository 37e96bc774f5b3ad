//! Vanguard session gateway library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! session extraction) so integration tests and the binary entrypoint can
//! both access them.

pub mod config;
pub mod cookies;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod registry;
pub mod router;
pub mod routes;
pub mod state;
