//! Domain logic for the session gateway, free of any HTTP machinery.
//!
//! - [`session`] -- session model, token codec, issuer and verifier.
//! - [`upstream`] -- soft-failure classification of platform envelopes.
//! - [`clock`] -- injectable time source.

pub mod clock;
pub mod error;
pub mod session;
pub mod upstream;
