//! Host session: roster ownership and the all-ready transition.

use std::sync::Arc;
use std::time::Duration;

use serde_json::value::RawValue;
use tokio::sync::mpsc;

use paddock_core::protocol::{Notice, Outbound, Participant};

use crate::channel::{ChannelEvent, ChannelHandle, ChannelManager, ConnectionState};
use crate::config::ClientConfig;
use crate::reconnect::RetryPolicy;
use crate::roster::Roster;
use crate::transport::Dialer;

/// What the host's display layer consumes.
#[derive(Debug)]
pub enum HostEvent {
    /// Membership or readiness changed; participants in join order.
    RosterChanged(Vec<Participant>),
    /// Every joined participant is ready: move the group from lobby to
    /// active session. Fires once per session, re-armed only if the set
    /// stops being all-ready.
    AllReady,
    GameStarted(Option<Box<RawValue>>),
    GameEnded(Option<Box<RawValue>>),
    /// Transient: the channel dropped and is being retried.
    ConnectionLost { reason: String },
    /// Terminal: retry budget exhausted, explicit retry required.
    ConnectionFailed { attempts: u32 },
}

#[derive(Clone)]
pub struct HostHandle {
    channel: ChannelHandle,
}

impl HostHandle {
    pub fn close(&self) {
        self.channel.close();
    }

    pub fn retry(&self) {
        self.channel.retry();
    }

    pub fn connection(&self) -> ConnectionState {
        self.channel.state()
    }

    pub fn connection_rx(&self) -> tokio::sync::watch::Receiver<ConnectionState> {
        self.channel.state_rx()
    }
}

pub struct HostSession;

impl HostSession {
    /// Connect as host. Registration is installed as the channel greeting,
    /// so it is transmitted exactly once per successful open even though the
    /// dial has not resolved yet.
    pub fn spawn(
        dialer: Arc<dyn Dialer>,
        cfg: &ClientConfig,
    ) -> (HostHandle, mpsc::UnboundedReceiver<HostEvent>) {
        let retry = RetryPolicy::new(
            cfg.reconnect.max_retries,
            Duration::from_millis(cfg.reconnect.backoff_ms),
        );
        let (channel, events) = ChannelManager::spawn(
            dialer,
            cfg.address.clone(),
            retry,
            Some(Outbound::register_host()),
        );

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run(events, tx));

        (HostHandle { channel }, rx)
    }
}

async fn run(
    mut events: mpsc::UnboundedReceiver<ChannelEvent>,
    tx: mpsc::UnboundedSender<HostEvent>,
) {
    let mut roster = Roster::new();

    while let Some(event) = events.recv().await {
        match event {
            // Registration already went out as the greeting.
            ChannelEvent::Opened => {}
            ChannelEvent::Message(env) => match Notice::classify(env) {
                Ok(Notice::GameStarted(data)) => {
                    let _ = tx.send(HostEvent::GameStarted(data));
                }
                Ok(Notice::GameEnded(data)) => {
                    let _ = tx.send(HostEvent::GameEnded(data));
                }
                Ok(notice) => {
                    let applied = roster.apply(&notice);
                    if applied.changed {
                        let _ = tx.send(HostEvent::RosterChanged(roster.snapshot()));
                    }
                    if applied.all_ready {
                        let _ = tx.send(HostEvent::AllReady);
                    }
                }
                // Known type, bad payload: drop the message, keep the channel.
                Err(e) => tracing::warn!(error = %e, "dropping malformed notice"),
            },
            ChannelEvent::Closed => {
                let _ = tx.send(HostEvent::ConnectionLost {
                    reason: "closed".into(),
                });
            }
            ChannelEvent::Errored(reason) => {
                let _ = tx.send(HostEvent::ConnectionLost { reason });
            }
            ChannelEvent::Failed { attempts } => {
                let _ = tx.send(HostEvent::ConnectionFailed { attempts });
            }
        }
    }
}
