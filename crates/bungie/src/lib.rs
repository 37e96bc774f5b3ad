//! Bungie.net platform client.
//!
//! - [`client`] -- OAuth token exchange, membership lookup and raw platform calls.
//! - [`dispatch`] -- the authenticated proxy dispatcher and its outcome taxonomy.

pub mod client;
pub mod dispatch;
pub mod error;

pub use client::{BungieClient, OAuthCredentials, UpstreamResponse};
pub use dispatch::{DispatchOutcome, Dispatcher};
pub use error::BungieError;
