//! Channel manager contracts: pre-open FIFO buffering, greeting-per-open,
//! close idempotence, malformed-message tolerance.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use paddock_client::channel::{ChannelEvent, ChannelManager, ConnectionState};
use paddock_client::reconnect::RetryPolicy;
use paddock_client::transport::memory::MemoryDialer;
use paddock_client::transport::TransportEvent;
use paddock_core::protocol::Outbound;

fn policy() -> RetryPolicy {
    RetryPolicy::new(5, Duration::from_millis(2000))
}

fn note(n: u32) -> Outbound {
    Outbound {
        msg_type: format!("note_{n}"),
        role: None,
        value: None,
        data: None,
    }
}

#[tokio::test]
async fn sends_before_open_flush_in_call_order() {
    let (dialer, mut peers, gate) = MemoryDialer::gated();
    let (handle, mut events) =
        ChannelManager::spawn(Arc::new(dialer), "mem://lobby".into(), policy(), None);

    // Issued while the dial is still held: must be buffered, never dropped.
    handle.send(note(1));
    handle.send(note(2));
    handle.send(note(3));
    assert_eq!(handle.state(), ConnectionState::Disconnected);

    gate.add_permits(1);
    let mut peer = peers.recv().await.unwrap();

    assert!(matches!(events.recv().await.unwrap(), ChannelEvent::Opened));
    for n in 1..=3 {
        let wire = peer.sent.recv().await.unwrap();
        assert_eq!(wire, format!(r#"{{"type":"note_{n}"}}"#));
    }

    // Post-open sends go straight through, after the flushed queue.
    handle.send(note(4));
    assert_eq!(peer.sent.recv().await.unwrap(), r#"{"type":"note_4"}"#);
}

#[tokio::test(start_paused = true)]
async fn greeting_precedes_buffered_sends_on_every_open() {
    let (dialer, mut peers) = MemoryDialer::new();
    let greeting = Outbound::register_host();
    let (handle, mut events) = ChannelManager::spawn(
        Arc::new(dialer),
        "mem://lobby".into(),
        policy(),
        Some(greeting),
    );
    handle.send(note(1));

    let mut peer = peers.recv().await.unwrap();
    assert!(matches!(events.recv().await.unwrap(), ChannelEvent::Opened));
    assert_eq!(
        peer.sent.recv().await.unwrap(),
        r#"{"type":"register","role":"host"}"#
    );
    assert_eq!(peer.sent.recv().await.unwrap(), r#"{"type":"note_1"}"#);

    // Drop the link: the channel retries and must greet again on reopen.
    peer.events.send(TransportEvent::Errored("cable pull".into())).unwrap();
    assert!(matches!(
        events.recv().await.unwrap(),
        ChannelEvent::Errored(_)
    ));

    let mut peer = peers.recv().await.unwrap();
    assert!(matches!(events.recv().await.unwrap(), ChannelEvent::Opened));
    assert_eq!(
        peer.sent.recv().await.unwrap(),
        r#"{"type":"register","role":"host"}"#
    );
}

#[tokio::test(start_paused = true)]
async fn connection_state_reflects_loss_during_backoff() {
    let (dialer, mut peers) = MemoryDialer::new();
    let (handle, mut events) =
        ChannelManager::spawn(Arc::new(dialer), "mem://lobby".into(), policy(), None);

    let peer = peers.recv().await.unwrap();
    assert!(matches!(events.recv().await.unwrap(), ChannelEvent::Opened));
    assert_eq!(handle.state(), ConnectionState::Open);

    peer.events
        .send(TransportEvent::Errored("cable pull".into()))
        .unwrap();
    assert!(matches!(
        events.recv().await.unwrap(),
        ChannelEvent::Errored(_)
    ));

    // Mid-backoff the mirror must already report the reconnect in
    // progress, not the link that is gone.
    let mut state_rx = handle.state_rx();
    state_rx
        .wait_for(|s| *s == ConnectionState::Connecting)
        .await
        .unwrap();
    tokio::time::advance(Duration::from_millis(500)).await;
    assert_eq!(handle.state(), ConnectionState::Connecting);

    // The backoff still resolves into a reopen.
    let _peer = peers.recv().await.unwrap();
    assert!(matches!(events.recv().await.unwrap(), ChannelEvent::Opened));
}

#[tokio::test]
async fn close_twice_yields_exactly_one_closed_transition() {
    let (dialer, mut peers) = MemoryDialer::new();
    let (handle, mut events) =
        ChannelManager::spawn(Arc::new(dialer), "mem://lobby".into(), policy(), None);

    let _peer = peers.recv().await.unwrap();
    assert!(matches!(events.recv().await.unwrap(), ChannelEvent::Opened));

    handle.close();
    handle.close();

    let mut closed = 0;
    while let Some(event) = events.recv().await {
        if matches!(event, ChannelEvent::Closed) {
            closed += 1;
        }
    }
    assert_eq!(closed, 1);
    assert_eq!(handle.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn close_cancels_a_pending_dial() {
    let (dialer, _peers, _gate) = MemoryDialer::gated();
    let (handle, mut events) =
        ChannelManager::spawn(Arc::new(dialer), "mem://lobby".into(), policy(), None);

    // Never release the gate; the close must win.
    handle.close();
    assert!(matches!(events.recv().await.unwrap(), ChannelEvent::Closed));
    assert!(events.recv().await.is_none());
    assert_eq!(handle.state(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn malformed_messages_are_dropped_without_closing_the_channel() {
    let (dialer, mut peers) = MemoryDialer::new();
    let (_handle, mut events) =
        ChannelManager::spawn(Arc::new(dialer), "mem://lobby".into(), policy(), None);

    let peer = peers.recv().await.unwrap();
    assert!(matches!(events.recv().await.unwrap(), ChannelEvent::Opened));

    peer.events
        .send(TransportEvent::Message("{ not json".into()))
        .unwrap();
    peer.events
        .send(TransportEvent::Message(r#"{"data":{}}"#.into()))
        .unwrap();
    peer.events
        .send(TransportEvent::Message(r#"{"type":"game_started"}"#.into()))
        .unwrap();

    // Only the well-formed envelope surfaces; the channel never closed.
    match events.recv().await.unwrap() {
        ChannelEvent::Message(env) => assert_eq!(env.msg_type, "game_started"),
        other => panic!("unexpected event: {other:?}"),
    }
}
