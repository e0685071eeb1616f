//! In-process transport for tests and embedding.
//!
//! Every accepted dial yields a `MemoryPeer` on the dialer's peer stream:
//! the far end of the link, from which a test reads what the client
//! transmitted and into which it injects inbound events. A refusing dialer
//! fails every attempt, for connect-failure scenarios.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};

use paddock_core::error::{PaddockError, Result};

use super::{Dialer, TransportEvent, TransportLink};

/// Far end of one dialed link.
pub struct MemoryPeer {
    /// Text frames the client side transmitted, in wire order.
    pub sent: mpsc::UnboundedReceiver<String>,
    /// Inject inbound traffic and lifecycle events toward the client.
    pub events: mpsc::UnboundedSender<TransportEvent>,
}

pub struct MemoryDialer {
    peers: mpsc::UnboundedSender<MemoryPeer>,
    refuse: bool,
    gate: Option<Arc<Semaphore>>,
    dials: Arc<AtomicU32>,
}

impl MemoryDialer {
    /// Dialer that accepts every attempt.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MemoryPeer>) {
        Self::build(false, None)
    }

    /// Dialer that refuses every attempt with `ConnectFailure`.
    pub fn refusing() -> (Self, mpsc::UnboundedReceiver<MemoryPeer>) {
        Self::build(true, None)
    }

    /// Dialer that holds each attempt until the returned gate gets a permit.
    /// Lets tests observe behavior while the channel is still connecting.
    pub fn gated() -> (Self, mpsc::UnboundedReceiver<MemoryPeer>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let (dialer, rx) = Self::build(false, Some(gate.clone()));
        (dialer, rx, gate)
    }

    fn build(
        refuse: bool,
        gate: Option<Arc<Semaphore>>,
    ) -> (Self, mpsc::UnboundedReceiver<MemoryPeer>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                peers: tx,
                refuse,
                gate,
                dials: Arc::new(AtomicU32::new(0)),
            },
            rx,
        )
    }

    /// Total dial attempts observed, accepted or refused.
    pub fn dial_count(&self) -> Arc<AtomicU32> {
        self.dials.clone()
    }
}

#[async_trait]
impl Dialer for MemoryDialer {
    async fn dial(&self, _address: &str) -> Result<TransportLink> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        if self.refuse {
            return Err(PaddockError::ConnectFailure("refused (memory)".into()));
        }
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|_| PaddockError::ConnectFailure("gate closed".into()))?;
            permit.forget();
        }

        let (tx_out, rx_out) = mpsc::unbounded_channel::<String>();
        let (tx_in, rx_in) = mpsc::unbounded_channel::<TransportEvent>();

        let _ = self.peers.send(MemoryPeer {
            sent: rx_out,
            events: tx_in,
        });

        Ok(TransportLink {
            outbound: tx_out,
            inbound: rx_in,
        })
    }
}
