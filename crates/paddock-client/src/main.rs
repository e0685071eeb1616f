//! paddock session runner.
//!
//! Loads `paddock.yaml`, connects over WebSocket as the configured role, and
//! logs session events until the channel is torn down or terminally failed.
//! Rendering and menus live elsewhere; this binary is the protocol runtime
//! plus structured logs.

use std::sync::Arc;

use tracing_subscriber::{fmt, EnvFilter};

use paddock_client::config::{self, Role};
use paddock_client::session::{HostEvent, HostSession, PlayerSession};
use paddock_client::transport::ws::WsDialer;

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let cfg = match config::load_from_file("paddock.yaml") {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(code = e.fault().as_str(), error = %e, "config load failed");
            std::process::exit(1);
        }
    };

    let dialer = Arc::new(WsDialer::new());
    tracing::info!(address = %cfg.address, role = ?cfg.role, "paddock starting");

    match cfg.role {
        Role::Host => run_host(dialer, &cfg).await,
        Role::Player => run_player(dialer, &cfg).await,
    }
}

async fn run_host(dialer: Arc<WsDialer>, cfg: &config::ClientConfig) {
    let (_handle, mut events) = HostSession::spawn(dialer, cfg);

    while let Some(event) = events.recv().await {
        match event {
            HostEvent::RosterChanged(roster) => {
                let view: Vec<String> = roster
                    .iter()
                    .map(|p| format!("{} ({}{})", p.name, p.id, if p.ready { ", ready" } else { "" }))
                    .collect();
                tracing::info!(players = ?view, "roster");
            }
            HostEvent::AllReady => {
                tracing::info!("all players ready; leaving the lobby");
            }
            HostEvent::GameStarted(_) => tracing::info!("game started"),
            HostEvent::GameEnded(_) => tracing::info!("game ended"),
            HostEvent::ConnectionLost { reason } => {
                tracing::warn!(%reason, "connection lost; retrying");
            }
            HostEvent::ConnectionFailed { attempts } => {
                tracing::error!(attempts, "connection failed terminally");
                std::process::exit(1);
            }
        }
    }
}

async fn run_player(dialer: Arc<WsDialer>, cfg: &config::ClientConfig) {
    let (handle, mut state_rx) = match PlayerSession::spawn(dialer, cfg) {
        Ok(pair) => pair,
        Err(e) => {
            tracing::error!(code = e.fault().as_str(), error = %e, "player session refused");
            std::process::exit(1);
        }
    };

    // No menus here: declare ready as soon as the session is up and report
    // state transitions for the display layer that would normally consume
    // the watch channel.
    handle.mark_ready();

    while state_rx.changed().await.is_ok() {
        let state = state_rx.borrow_and_update().clone();
        tracing::info!(
            connection = ?state.connection,
            ready = state.ready,
            last_failure = state.last_failure.as_deref().unwrap_or("-"),
            "session state"
        );
    }
}
