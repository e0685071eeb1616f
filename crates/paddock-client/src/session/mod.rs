//! Session roles.
//!
//! Two fixed roles exist in this protocol: the host, which owns the
//! authoritative roster and the lobby-to-active transition, and the player,
//! which tracks only its own readiness and connectivity. Both are thin
//! dispatch loops over the channel actor's event stream; neither touches
//! protocol state from more than one task.

pub mod host;
pub mod player;

pub use host::{HostEvent, HostHandle, HostSession};
pub use player::{LocalSessionState, PlayerHandle, PlayerSession};
