//! Request extractors.
//!
//! - [`session::SessionUser`] -- Verifies the session cookie and yields the session.

pub mod session;
