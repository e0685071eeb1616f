//! Transport seam.
//!
//! The protocol core assumes a reliable, ordered, message-oriented channel
//! with explicit open/message/close/error notifications; this module is that
//! assumption as a trait. A `Dialer` turns an address into one
//! `TransportLink` per successful attempt: an outbound text sender and an
//! inbound event receiver. Framing, TLS, and address discovery all live
//! behind the dialer.

pub mod memory;
pub mod ws;

use async_trait::async_trait;
use tokio::sync::mpsc;

use paddock_core::error::Result;

/// Lifecycle and traffic notifications from an established link.
#[derive(Debug)]
pub enum TransportEvent {
    /// One text frame, one envelope.
    Message(String),
    /// Orderly close by the far end.
    Closed,
    /// Fault on an open link; treated as a precursor to close.
    Errored(String),
}

/// One established connection. Dropping `outbound` tears the link down.
pub struct TransportLink {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Connection factory. `dial` resolves to exactly one terminal outcome per
/// attempt: a live link or a `ConnectFailure`.
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    async fn dial(&self, address: &str) -> Result<TransportLink>;
}
