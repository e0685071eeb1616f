//! Channel manager: the connection lifecycle actor.
//!
//! One actor task per process owns the outbound channel end to end: dialing,
//! the open-link pump, the fixed-backoff retry loop, and the terminal-failure
//! park. All connection state lives inside the task; callers interact through
//! a cheap `ChannelHandle` (commands over an unbounded mpsc, state mirrored
//! on a watch channel) and consume lifecycle as `ChannelEvent`s.
//!
//! Contracts kept here:
//! - `send` is accepted in any state; while not open it is FIFO-buffered and
//!   flushed, in order, the moment the link opens. Callers never wait.
//! - Exactly one `Opened` per successful attempt. The greeting (registration)
//!   is transmitted first after every open, before the buffered queue.
//! - `close` is deliberate teardown: idempotent, cancels an in-flight dial or
//!   backoff timer, and suppresses any retry.
//! - A lost or failed connection consults the retry policy; exhaustion emits
//!   a terminal `Failed` and the actor parks until `retry` or `close`.
//! - Malformed inbound payloads are logged and dropped; the link stays open.

use std::collections::VecDeque;
use std::pin::pin;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use paddock_core::protocol::{wire, Envelope, Outbound};

use crate::reconnect::{RetryAction, RetryPolicy};
use crate::transport::{Dialer, TransportEvent, TransportLink};

/// Connection state, one per process. Mutated only by the actor task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Closing,
    Failed,
}

/// Lifecycle notifications delivered to the session layer, one at a time,
/// in channel order.
#[derive(Debug)]
pub enum ChannelEvent {
    Opened,
    Message(Envelope),
    Closed,
    Errored(String),
    /// Retry budget exhausted; no further attempts until an explicit retry.
    Failed { attempts: u32 },
}

enum Command {
    Send(Outbound),
    Close,
    Retry,
}

/// Cheap cloneable handle to the channel actor.
#[derive(Clone)]
pub struct ChannelHandle {
    cmd: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<ConnectionState>,
}

impl ChannelHandle {
    /// Queue an envelope for transmission. Never blocks: transmitted
    /// immediately when open, buffered in FIFO order otherwise.
    pub fn send(&self, msg: Outbound) {
        let _ = self.cmd.send(Command::Send(msg));
    }

    /// Deliberate teardown. Idempotent; closing an already-closed channel is
    /// a no-op, not an error.
    pub fn close(&self) {
        let _ = self.cmd.send(Command::Close);
    }

    /// Re-arm after terminal failure (user-initiated retry).
    pub fn retry(&self) {
        let _ = self.cmd.send(Command::Retry);
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Watch mirror of the connection state, for display layers.
    pub fn state_rx(&self) -> watch::Receiver<ConnectionState> {
        self.state.clone()
    }
}

pub struct ChannelManager;

impl ChannelManager {
    /// Spawn the channel actor. `greeting`, when set, is transmitted exactly
    /// once after every successful open. This is the deferral mechanism that makes
    /// registration safe to request before the dial has resolved.
    pub fn spawn(
        dialer: Arc<dyn Dialer>,
        address: String,
        retry: RetryPolicy,
        greeting: Option<Outbound>,
    ) -> (ChannelHandle, mpsc::UnboundedReceiver<ChannelEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let actor = Actor {
            dialer,
            address,
            retry,
            greeting,
            pending: VecDeque::new(),
            cmd_rx,
            events: event_tx,
            state: state_tx,
        };
        tokio::spawn(actor.run());

        (
            ChannelHandle {
                cmd: cmd_tx,
                state: state_rx,
            },
            event_rx,
        )
    }
}

/// What a lifecycle phase decided about the actor's future.
enum Flow {
    Redial,
    Stop,
}

enum DialOutcome {
    Link(TransportLink),
    Lost,
    Cancelled,
}

struct Actor {
    dialer: Arc<dyn Dialer>,
    address: String,
    retry: RetryPolicy,
    greeting: Option<Outbound>,
    pending: VecDeque<Outbound>,
    cmd_rx: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<ChannelEvent>,
    state: watch::Sender<ConnectionState>,
}

impl Actor {
    async fn run(mut self) {
        loop {
            self.set_state(ConnectionState::Connecting);
            let link = match self.dial_phase().await {
                DialOutcome::Link(link) => link,
                // Dial failed: consult the policy.
                DialOutcome::Lost => match self.loss_phase().await {
                    Flow::Redial => continue,
                    Flow::Stop => break,
                },
                // Deliberate close cancelled the attempt.
                DialOutcome::Cancelled => break,
            };

            match self.open_phase(link).await {
                Flow::Stop => break,
                Flow::Redial => match self.loss_phase().await {
                    Flow::Redial => continue,
                    Flow::Stop => break,
                },
            }
        }
        tracing::debug!("channel actor stopped");
    }

    /// One connection attempt, cancellable by a deliberate close. Sends
    /// issued meanwhile are buffered.
    async fn dial_phase(&mut self) -> DialOutcome {
        tracing::info!(address = %self.address, "connecting");
        let dialer = self.dialer.clone();
        let address = self.address.clone();
        let mut dial = pin!(dialer.dial(&address));

        loop {
            tokio::select! {
                res = &mut dial => {
                    return match res {
                        Ok(link) => DialOutcome::Link(link),
                        Err(e) => {
                            tracing::warn!(error = %e, "connect attempt failed");
                            self.emit(ChannelEvent::Errored(e.to_string()));
                            DialOutcome::Lost
                        }
                    };
                }
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(Command::Send(m)) => self.pending.push_back(m),
                        Some(Command::Retry) => {}
                        Some(Command::Close) | None => {
                            self.deliberate_close(true);
                            return DialOutcome::Cancelled;
                        }
                    }
                }
            }
        }
    }

    /// The open link: greeting, FIFO flush, then pump until loss or close.
    async fn open_phase(&mut self, mut link: TransportLink) -> Flow {
        self.retry.on_open();
        self.set_state(ConnectionState::Open);
        self.emit(ChannelEvent::Opened);
        tracing::info!("channel open");

        // Registration first, then the buffered queue in call order.
        if let Some(greeting) = self.greeting.clone() {
            if self.transmit(&link, &greeting).is_err() {
                return Flow::Redial;
            }
        }
        while let Some(msg) = self.pending.pop_front() {
            if self.transmit(&link, &msg).is_err() {
                return Flow::Redial;
            }
        }

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(Command::Send(m)) => {
                            if self.transmit(&link, &m).is_err() {
                                return Flow::Redial;
                            }
                        }
                        Some(Command::Retry) => {}
                        Some(Command::Close) | None => {
                            self.deliberate_close(true);
                            return Flow::Stop;
                        }
                    }
                }

                ev = link.inbound.recv() => {
                    match ev {
                        Some(TransportEvent::Message(text)) => match wire::decode(&text) {
                            Ok(env) => self.emit(ChannelEvent::Message(env)),
                            // Dropped message, not a channel error.
                            Err(e) => tracing::warn!(error = %e, "dropping malformed message"),
                        },
                        Some(TransportEvent::Errored(reason)) => {
                            tracing::warn!(%reason, "channel errored");
                            self.emit(ChannelEvent::Errored(reason));
                            return Flow::Redial;
                        }
                        Some(TransportEvent::Closed) | None => {
                            tracing::info!("channel closed by far end");
                            self.emit(ChannelEvent::Closed);
                            return Flow::Redial;
                        }
                    }
                }
            }
        }
    }

    /// After a loss: backoff-and-redial, or park in terminal failure until
    /// an explicit retry. Both waits are cancellable by a deliberate close.
    async fn loss_phase(&mut self) -> Flow {
        // The link is gone; the mirror must not keep reporting `Open`
        // through the backoff window.
        self.set_state(ConnectionState::Connecting);
        match self.retry.next_action() {
            RetryAction::Backoff(delay) => {
                let attempt = self.retry.attempts();
                tracing::info!(attempt, delay_ms = delay.as_millis() as u64, "retrying after backoff");
                let mut sleep = pin!(tokio::time::sleep(delay));
                loop {
                    tokio::select! {
                        _ = &mut sleep => return Flow::Redial,
                        cmd = self.cmd_rx.recv() => {
                            match cmd {
                                Some(Command::Send(m)) => self.pending.push_back(m),
                                Some(Command::Retry) => {}
                                Some(Command::Close) | None => {
                                    self.deliberate_close(false);
                                    return Flow::Stop;
                                }
                            }
                        }
                    }
                }
            }
            RetryAction::GiveUp => {
                let attempts = self.retry.attempts();
                tracing::error!(attempts, "retries exhausted; giving up");
                self.set_state(ConnectionState::Failed);
                self.emit(ChannelEvent::Failed { attempts });
                loop {
                    match self.cmd_rx.recv().await {
                        Some(Command::Send(m)) => self.pending.push_back(m),
                        Some(Command::Retry) => {
                            tracing::info!("explicit retry after terminal failure");
                            self.retry.reset();
                            return Flow::Redial;
                        }
                        Some(Command::Close) | None => {
                            self.deliberate_close(false);
                            return Flow::Stop;
                        }
                    }
                }
            }
        }
    }

    /// Deliberate teardown: `Closing` then `Disconnected`. `announce` is
    /// true when the consumer has not already seen a `Closed`/`Errored` for
    /// this connection.
    fn deliberate_close(&mut self, announce: bool) {
        self.set_state(ConnectionState::Closing);
        if announce {
            self.emit(ChannelEvent::Closed);
        }
        self.set_state(ConnectionState::Disconnected);
        tracing::info!("channel closed deliberately");
    }

    fn transmit(&mut self, link: &TransportLink, msg: &Outbound) -> std::result::Result<(), ()> {
        let text = match msg.encode() {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "dropping unencodable envelope");
                return Ok(());
            }
        };
        if link.outbound.send(text).is_err() {
            // Pump is gone; surface as a channel error and let the retry
            // path take over.
            self.emit(ChannelEvent::Errored("transport send failed".into()));
            return Err(());
        }
        Ok(())
    }

    fn emit(&self, event: ChannelEvent) {
        let _ = self.events.send(event);
    }

    fn set_state(&self, next: ConnectionState) {
        self.state.send_replace(next);
    }
}
