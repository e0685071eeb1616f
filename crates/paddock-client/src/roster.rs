//! Host-side roster and readiness state machine.
//!
//! Authoritative set of joined participants, keyed by id with join order
//! tracked separately for deterministic display. Pure and synchronous: the
//! session task owns it and feeds it notices one at a time, so no locking is
//! involved. Events for absent ids are no-ops, never errors: the channel
//! preserves per-participant order, so such events are stale by definition.
//!
//! The all-ready signal is evaluated only while applying `player_ready`,
//! latched so it fires once, and re-armed whenever a mutation makes the set
//! not-all-ready again. An empty roster is never all-ready.

use std::collections::HashMap;

use paddock_core::protocol::{Notice, Participant, PlayerId};

/// What applying one notice did to the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Applied {
    /// Membership or readiness changed (display should refresh).
    pub changed: bool,
    /// The one-shot all-ready signal fired on this notice.
    pub all_ready: bool,
}

#[derive(Debug, Default)]
pub struct Roster {
    members: HashMap<PlayerId, Participant>,
    order: Vec<PlayerId>,
    announced: bool,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, notice: &Notice) -> Applied {
        let mut applied = Applied::default();

        match notice {
            Notice::NewClient(p) => {
                if self.members.contains_key(&p.id) {
                    tracing::warn!(player_id = %p.id, "duplicate join ignored");
                } else {
                    self.order.push(p.id.clone());
                    self.members.insert(p.id.clone(), p.clone());
                    tracing::info!(player_id = %p.id, player_name = %p.name, "player joined");
                    applied.changed = true;
                }
            }
            Notice::ClientDisconnected(id) => {
                if self.members.remove(id).is_some() {
                    self.order.retain(|o| o != id);
                    tracing::info!(player_id = %id, "player left");
                    applied.changed = true;
                } else {
                    tracing::debug!(player_id = %id, "disconnect for absent id ignored");
                }
            }
            Notice::PlayerReady(id) => {
                match self.members.get_mut(id) {
                    Some(p) => {
                        p.ready = true;
                        applied.changed = true;
                    }
                    None => {
                        tracing::debug!(player_id = %id, "ready for absent id ignored");
                    }
                }
                if applied.changed && self.is_all_ready() && !self.announced {
                    self.announced = true;
                    applied.all_ready = true;
                    tracing::info!(players = self.len(), "all participants ready");
                }
            }
            // Informational; no roster mutation.
            Notice::GameStarted(_) | Notice::GameEnded(_) => {}
            Notice::Unknown { msg_type } => {
                tracing::warn!(%msg_type, "unknown message type dropped");
            }
        }

        // Re-arm the latch once the set stops being all-ready.
        if !self.is_all_ready() {
            self.announced = false;
        }

        applied
    }

    fn is_all_ready(&self) -> bool {
        !self.members.is_empty() && self.members.values().all(|p| p.ready)
    }

    /// Participants in join order.
    pub fn snapshot(&self) -> Vec<Participant> {
        self.order
            .iter()
            .filter_map(|id| self.members.get(id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
