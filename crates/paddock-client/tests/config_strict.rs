#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use paddock_client::config;
use paddock_core::error::Fault;

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
address: "ws://localhost:8080"
role: host
reconnect:
  max_retriez: 3 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.fault(), Fault::Config);
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
address: "ws://localhost:8080"
role: host
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.reconnect.max_retries, 5);
    assert_eq!(cfg.reconnect.backoff_ms, 2000);
}

#[test]
fn player_requires_a_name() {
    let bad = r#"
version: 1
address: "ws://localhost:8080"
role: player
"#;
    assert!(config::load_from_str(bad).is_err());

    let bad_blank = r#"
version: 1
address: "ws://localhost:8080"
role: player
player_name: "  "
"#;
    assert!(config::load_from_str(bad_blank).is_err());

    let ok = r#"
version: 1
address: "ws://localhost:8080"
role: player
player_name: "Ava"
"#;
    assert!(config::load_from_str(ok).is_ok());
}

#[test]
fn backoff_bounds_are_enforced() {
    let bad = r#"
version: 1
address: "ws://localhost:8080"
role: host
reconnect:
  backoff_ms: 50
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("backoff_ms"));
}
