//! Client config loader (strict parsing).

use std::fs;

use serde::Deserialize;

use paddock_core::error::{PaddockError, Result};

pub fn load_from_file(path: &str) -> Result<ClientConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| PaddockError::Config(format!("read config failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ClientConfig> {
    let cfg: ClientConfig = serde_yaml::from_str(s)
        .map_err(|e| PaddockError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Host,
    Player,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub version: u32,

    /// Channel address, e.g. "ws://localhost:8080". Discovery of this value
    /// is out of scope; it is handed verbatim to the dialer.
    pub address: String,

    pub role: Role,

    /// Required for `role: player`, ignored for `role: host`.
    #[serde(default)]
    pub player_name: Option<String>,

    #[serde(default)]
    pub reconnect: ReconnectSection,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(PaddockError::Config("version must be 1".into()));
        }
        if self.address.trim().is_empty() {
            return Err(PaddockError::Config("address must not be empty".into()));
        }
        if self.role == Role::Player {
            match &self.player_name {
                Some(name) if !name.trim().is_empty() => {}
                _ => {
                    return Err(PaddockError::Config(
                        "role player requires a non-empty player_name".into(),
                    ))
                }
            }
        }
        self.reconnect.validate()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReconnectSection {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
}

impl Default for ReconnectSection {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
        }
    }
}

impl ReconnectSection {
    pub fn validate(&self) -> Result<()> {
        if !(100..=60_000).contains(&self.backoff_ms) {
            return Err(PaddockError::Config(
                "reconnect.backoff_ms must be between 100 and 60000".into(),
            ));
        }
        if self.max_retries > 100 {
            return Err(PaddockError::Config(
                "reconnect.max_retries must be at most 100".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_retries() -> u32 {
    5
}
fn default_backoff_ms() -> u64 {
    2000
}
