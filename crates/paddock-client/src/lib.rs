//! paddock client library entry.
//!
//! This crate wires the transport, channel actor, reconnection policy, and
//! the two session roles (host roster, player local state) into a cohesive
//! device-side runtime. It is intended to be consumed by the binary
//! (`main.rs`), by integration tests, and by embedding applications (UI /
//! rendering layers observe sessions through the handles and event streams
//! exposed here).

pub mod channel;
pub mod config;
pub mod reconnect;
pub mod roster;
pub mod session;
pub mod transport;
