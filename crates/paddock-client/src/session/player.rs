//! Player session: own readiness and connectivity, nothing else.
//!
//! No roster of other participants lives on this side; the host is the
//! single source of truth for membership and the all-ready decision.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};

use paddock_core::error::{PaddockError, Result};
use paddock_core::protocol::Outbound;

use crate::channel::{ChannelEvent, ChannelHandle, ChannelManager, ConnectionState};
use crate::config::ClientConfig;
use crate::reconnect::RetryPolicy;
use crate::transport::Dialer;

/// This participant's view of itself, published for the display layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSessionState {
    /// Optimistic: set on the local action, not on server confirmation.
    /// Never reset automatically.
    pub ready: bool,
    pub connection: ConnectionState,
    /// Last-known failure reason, for display.
    pub last_failure: Option<String>,
}

impl LocalSessionState {
    fn initial() -> Self {
        Self {
            ready: false,
            connection: ConnectionState::Disconnected,
            last_failure: None,
        }
    }
}

enum PlayerCommand {
    MarkReady,
}

#[derive(Clone)]
pub struct PlayerHandle {
    channel: ChannelHandle,
    cmd: mpsc::UnboundedSender<PlayerCommand>,
}

impl PlayerHandle {
    /// Declare readiness. Safe to call before the channel is open: the
    /// envelope is buffered and flushed after registration.
    pub fn mark_ready(&self) {
        let _ = self.cmd.send(PlayerCommand::MarkReady);
    }

    pub fn close(&self) {
        self.channel.close();
    }

    pub fn retry(&self) {
        self.channel.retry();
    }

    pub fn connection(&self) -> ConnectionState {
        self.channel.state()
    }
}

pub struct PlayerSession;

impl PlayerSession {
    /// Connect as a player. Fails without connecting when the config carries
    /// no usable name; the registration envelope must never be sent empty.
    pub fn spawn(
        dialer: Arc<dyn Dialer>,
        cfg: &ClientConfig,
    ) -> Result<(PlayerHandle, watch::Receiver<LocalSessionState>)> {
        let name = cfg
            .player_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| {
                PaddockError::RegistrationPrecondition("player name must not be empty".into())
            })?;

        let retry = RetryPolicy::new(
            cfg.reconnect.max_retries,
            Duration::from_millis(cfg.reconnect.backoff_ms),
        );
        let greeting = Outbound::register_player(&name)?;
        let (channel, events) =
            ChannelManager::spawn(dialer, cfg.address.clone(), retry, Some(greeting));

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(LocalSessionState::initial());

        tokio::spawn(run(name, channel.clone(), events, cmd_rx, state_tx));

        Ok((
            PlayerHandle {
                channel,
                cmd: cmd_tx,
            },
            state_rx,
        ))
    }
}

async fn run(
    player_name: String,
    channel: ChannelHandle,
    mut events: mpsc::UnboundedReceiver<ChannelEvent>,
    mut cmd_rx: mpsc::UnboundedReceiver<PlayerCommand>,
    state_tx: watch::Sender<LocalSessionState>,
) {
    let mut connection_rx = channel.state_rx();

    loop {
        tokio::select! {
            changed = connection_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let connection = *connection_rx.borrow_and_update();
                state_tx.send_modify(|s| s.connection = connection);
            }

            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    ChannelEvent::Opened => {
                        state_tx.send_modify(|s| s.last_failure = None);
                    }
                    // Players act on nothing inbound today; host broadcasts
                    // are forward-compatible noise on this side.
                    ChannelEvent::Message(env) => {
                        tracing::debug!(msg_type = %env.msg_type, "ignoring host broadcast");
                    }
                    ChannelEvent::Closed => {}
                    ChannelEvent::Errored(reason) => {
                        state_tx.send_modify(|s| s.last_failure = Some(reason));
                    }
                    ChannelEvent::Failed { attempts } => {
                        state_tx.send_modify(|s| {
                            s.last_failure =
                                Some(format!("retries exhausted after {attempts} attempts"));
                        });
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else { break };
                match cmd {
                    PlayerCommand::MarkReady => {
                        // Idempotent: the flag never resets, and one ready
                        // envelope is enough.
                        let already = state_tx.borrow().ready;
                        if !already {
                            state_tx.send_modify(|s| s.ready = true);
                            channel.send(Outbound::ready(&player_name));
                        }
                    }
                }
            }
        }
    }
}
