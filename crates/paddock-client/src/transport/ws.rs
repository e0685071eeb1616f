//! WebSocket dialer (tokio-tungstenite).
//!
//! Each successful dial spawns one pump task that owns the socket: it
//! forwards outbound text into the sink and surfaces inbound frames as
//! `TransportEvent`s. Dropping the link's outbound sender ends the pump,
//! which sends a close frame on the way out.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use paddock_core::error::{PaddockError, Result};

use super::{Dialer, TransportEvent, TransportLink};

#[derive(Debug, Default)]
pub struct WsDialer;

impl WsDialer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Dialer for WsDialer {
    async fn dial(&self, address: &str) -> Result<TransportLink> {
        let (stream, _) = connect_async(address)
            .await
            .map_err(|e| PaddockError::ConnectFailure(e.to_string()))?;

        let (tx_out, rx_out) = mpsc::unbounded_channel::<String>();
        let (tx_in, rx_in) = mpsc::unbounded_channel::<TransportEvent>();

        tokio::spawn(pump(stream, rx_out, tx_in));

        Ok(TransportLink {
            outbound: tx_out,
            inbound: rx_in,
        })
    }
}

async fn pump(
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    mut rx_out: mpsc::UnboundedReceiver<String>,
    tx_in: mpsc::UnboundedSender<TransportEvent>,
) {
    let (mut ws_tx, mut ws_rx) = stream.split();

    loop {
        tokio::select! {
            maybe_out = rx_out.recv() => {
                match maybe_out {
                    Some(text) => {
                        if let Err(e) = ws_tx.send(Message::Text(text)).await {
                            let _ = tx_in.send(TransportEvent::Errored(e.to_string()));
                            break;
                        }
                    }
                    // Link dropped by the owner: orderly shutdown.
                    None => {
                        let _ = ws_tx.send(Message::Close(None)).await;
                        break;
                    }
                }
            }

            incoming = ws_rx.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if tx_in.send(TransportEvent::Message(text)).is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        // This protocol is text-only.
                        tracing::debug!("ignoring binary frame");
                    }
                    Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                    Some(Ok(Message::Close(_))) | None => {
                        let _ = tx_in.send(TransportEvent::Closed);
                        break;
                    }
                    Some(Err(e)) => {
                        let _ = tx_in.send(TransportEvent::Errored(e.to_string()));
                        break;
                    }
                }
            }
        }
    }
}
