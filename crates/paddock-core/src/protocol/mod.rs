//! Protocol modules (wire envelope + typed message layer).
//!
//! Two layers:
//! - `wire`: the JSON envelope as it travels over the channel, with payload
//!   fields kept as `RawValue` for lazy parsing.
//! - `events`: typed view over the envelope: outbound builders for the
//!   client→host messages and `Notice` classification for host→client ones.
//!
//! All parsers are panic-free: malformed input is reported as
//! `PaddockError::MalformedPayload` instead of panicking, and the channel
//! that delivered it stays open.

pub mod events;
pub mod wire;

pub use events::{Notice, Participant, PlayerId};
pub use wire::{Envelope, Outbound};
