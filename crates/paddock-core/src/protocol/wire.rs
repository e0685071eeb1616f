//! Wire envelope (JSON, one envelope per channel message).
//!
//! Inbound envelopes store `value`/`data` as `RawValue` so payload parsing
//! happens lazily, once the `type` has selected a handler. Inbound is
//! consumed (no Clone); outbound is produced.

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{PaddockError, Result};

/// Inbound envelope. `type` is mandatory and selects dispatch; the payload
/// fields are whatever the type says they are.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    /// Message type (field name is `type` on the wire).
    #[serde(rename = "type")]
    pub msg_type: String,
    /// Role marker, present on registration messages.
    #[serde(default)]
    pub role: Option<String>,
    /// Client-supplied payload, stored as raw JSON (lazy parsing).
    #[serde(default)]
    pub value: Option<Box<RawValue>>,
    /// Host-supplied payload, stored as raw JSON (lazy parsing).
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
}

/// Decode one channel message into an envelope.
///
/// Failure means the message is dropped, not that the channel is broken:
/// callers must log and continue.
pub fn decode(text: &str) -> Result<Envelope> {
    serde_json::from_str(text)
        .map_err(|e| PaddockError::MalformedPayload(format!("invalid envelope json: {e}")))
}

/// Outbound envelope. Absent fields are omitted on the wire.
#[derive(Debug, Clone, Serialize)]
pub struct Outbound {
    #[serde(rename = "type")]
    pub msg_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl Outbound {
    /// Serialize for transmission. Infallible for the envelopes this crate
    /// builds; Result only to keep the core panic-free.
    pub fn encode(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| PaddockError::Internal(format!("envelope encode failed: {e}")))
    }
}
