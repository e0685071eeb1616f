//! Wire envelope vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use paddock_core::error::Fault;
use paddock_core::protocol::{wire, Notice, PlayerId};

fn load(name: &str) -> String {
    fs::read_to_string(format!("tests/vectors/{name}")).unwrap()
}

#[test]
fn parse_envelope_min() {
    let env = wire::decode(&load("envelope_min.json")).unwrap();
    assert_eq!(env.msg_type, "game_started");
    assert!(env.role.is_none());
    assert!(env.data.is_none());
}

#[test]
fn parse_envelope_full() {
    let env = wire::decode(&load("envelope_full.json")).unwrap();
    assert_eq!(env.msg_type, "new_client");
    let raw = env.data.as_ref().unwrap();
    assert!(raw.get().contains("\"playerName\""));

    match Notice::classify(env).unwrap() {
        Notice::NewClient(p) => {
            assert_eq!(p.id, PlayerId::from("c9f1"));
            assert_eq!(p.name, "Ava");
        }
        other => panic!("unexpected notice: {other:?}"),
    }
}

#[test]
fn parse_envelope_register() {
    let env = wire::decode(&load("envelope_register.json")).unwrap();
    assert_eq!(env.msg_type, "register");
    assert_eq!(env.role.as_deref(), Some("client"));
    assert!(env.value.as_ref().unwrap().get().contains("Ava"));
}

#[test]
fn missing_type_is_malformed() {
    let err = wire::decode(&load("envelope_missing_type.json")).expect_err("must fail");
    assert_eq!(err.fault(), Fault::MalformedPayload);
}

#[test]
fn truncated_json_is_malformed() {
    let err = wire::decode(&load("envelope_truncated.json")).expect_err("must fail");
    assert_eq!(err.fault(), Fault::MalformedPayload);
}
