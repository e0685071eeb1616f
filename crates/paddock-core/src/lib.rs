//! paddock core: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire envelope, the typed message layer, and the
//! error surface shared by the client runtime and embedders. It carries no
//! transport or runtime dependencies so it can be reused in multiple
//! contexts (native client, tests, future server tooling).
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `PaddockError`/`Result` so a session
//! process does not crash on malformed traffic.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod protocol;

/// Shared result type.
pub use error::{PaddockError, Result};
