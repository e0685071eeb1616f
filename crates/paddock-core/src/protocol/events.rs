//! Typed message layer over the wire envelope.
//!
//! Outbound: builders for the client→host messages (`register`, `ready`).
//! Inbound: `Notice` classification of host→client messages. Unknown types
//! classify to `Notice::Unknown` so new server messages never break old
//! clients; known types with malformed payloads are `MalformedPayload`.

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::value::RawValue;

use crate::error::{PaddockError, Result};
use crate::protocol::wire::{Envelope, Outbound};

/// Opaque participant identifier, unique within a session. Assigned by the
/// channel endpoint, never synthesized locally.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        PlayerId(s.to_owned())
    }
}

/// One joined player, as held by the host roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: PlayerId,
    pub name: String,
    pub ready: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewClientData {
    player_id: PlayerId,
    player_name: String,
    #[serde(default)]
    ready: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerRefData {
    player_id: PlayerId,
}

/// Host→client notice, classified from the envelope `type`.
#[derive(Debug)]
pub enum Notice {
    NewClient(Participant),
    ClientDisconnected(PlayerId),
    PlayerReady(PlayerId),
    /// Opaque payload passed through to the consumer.
    GameStarted(Option<Box<RawValue>>),
    GameEnded(Option<Box<RawValue>>),
    /// Forward-compatible: accepted syntactically, ignored semantically.
    Unknown { msg_type: String },
}

fn payload<'a, T: Deserialize<'a>>(env: &'a Envelope) -> Result<T> {
    let raw = env.data.as_deref().ok_or_else(|| {
        PaddockError::MalformedPayload(format!("{} requires data", env.msg_type))
    })?;
    serde_json::from_str(raw.get()).map_err(|e| {
        PaddockError::MalformedPayload(format!("{} invalid data: {e}", env.msg_type))
    })
}

impl Notice {
    /// Classify a decoded envelope into a typed notice.
    pub fn classify(env: Envelope) -> Result<Notice> {
        match env.msg_type.as_str() {
            "new_client" => {
                let d: NewClientData = payload(&env)?;
                Ok(Notice::NewClient(Participant {
                    id: d.player_id,
                    name: d.player_name,
                    ready: d.ready,
                }))
            }
            "client_disconnected" => {
                let d: PlayerRefData = payload(&env)?;
                Ok(Notice::ClientDisconnected(d.player_id))
            }
            "player_ready" => {
                let d: PlayerRefData = payload(&env)?;
                Ok(Notice::PlayerReady(d.player_id))
            }
            "game_started" => Ok(Notice::GameStarted(env.data)),
            "game_ended" => Ok(Notice::GameEnded(env.data)),
            _ => Ok(Notice::Unknown {
                msg_type: env.msg_type,
            }),
        }
    }
}

impl Outbound {
    /// Role declaration for the host endpoint.
    pub fn register_host() -> Outbound {
        Outbound {
            msg_type: "register".into(),
            role: Some("host".into()),
            value: None,
            data: None,
        }
    }

    /// Role declaration for a player endpoint. The name is required; an
    /// empty or whitespace name is rejected locally and never sent.
    pub fn register_player(player_name: &str) -> Result<Outbound> {
        if player_name.trim().is_empty() {
            return Err(PaddockError::RegistrationPrecondition(
                "player name must not be empty".into(),
            ));
        }
        Ok(Outbound {
            msg_type: "register".into(),
            role: Some("client".into()),
            value: Some(json!({ "playerName": player_name })),
            data: None,
        })
    }

    /// Player readiness declaration.
    pub fn ready(player_name: &str) -> Outbound {
        Outbound {
            msg_type: "ready".into(),
            role: None,
            value: Some(json!({ "playerName": player_name })),
            data: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::protocol::wire::decode;

    #[test]
    fn classify_new_client() {
        let env = decode(
            r#"{"type":"new_client","data":{"playerId":"p1","playerName":"Ava","ready":false}}"#,
        )
        .unwrap();
        match Notice::classify(env).unwrap() {
            Notice::NewClient(p) => {
                assert_eq!(p.id, PlayerId::from("p1"));
                assert_eq!(p.name, "Ava");
                assert!(!p.ready);
            }
            other => panic!("unexpected notice: {other:?}"),
        }
    }

    #[test]
    fn classify_unknown_type_is_not_an_error() {
        let env = decode(r#"{"type":"server_gossip","data":{}}"#).unwrap();
        match Notice::classify(env).unwrap() {
            Notice::Unknown { msg_type } => assert_eq!(msg_type, "server_gossip"),
            other => panic!("unexpected notice: {other:?}"),
        }
    }

    #[test]
    fn classify_known_type_with_bad_data_is_malformed() {
        let env = decode(r#"{"type":"player_ready"}"#).unwrap();
        let err = Notice::classify(env).expect_err("missing data must fail");
        assert_eq!(err.fault(), crate::error::Fault::MalformedPayload);
    }

    #[test]
    fn register_player_rejects_empty_name() {
        let err = Outbound::register_player("  ").expect_err("must fail");
        assert_eq!(err.fault(), crate::error::Fault::RegistrationPrecondition);
    }

    #[test]
    fn register_player_wire_shape() {
        let s = Outbound::register_player("Ava").unwrap().encode().unwrap();
        assert_eq!(
            s,
            r#"{"type":"register","role":"client","value":{"playerName":"Ava"}}"#
        );
    }

    #[test]
    fn ready_wire_shape() {
        let s = Outbound::ready("Ava").encode().unwrap();
        assert_eq!(s, r#"{"type":"ready","value":{"playerName":"Ava"}}"#);
    }
}
