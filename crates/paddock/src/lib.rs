//! Top-level facade crate for paddock.
//!
//! Re-exports the protocol core and the client runtime so embedders can
//! depend on a single crate.

pub mod core {
    pub use paddock_core::*;
}

pub mod client {
    pub use paddock_client::*;
}
