//! Shared error type across paddock crates.

use thiserror::Error;

/// Stable fault codes (classification of the error surface).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// A connection attempt never reached the open state.
    ConnectFailure,
    /// An open channel reported a fault.
    ChannelError,
    /// Inbound payload was not a well-formed envelope.
    MalformedPayload,
    /// Registration attempted without its required data.
    RegistrationPrecondition,
    /// Retry budget exhausted; terminal until an explicit retry.
    RetriesExhausted,
    /// Configuration rejected.
    Config,
    /// Internal invariant violation.
    Internal,
}

impl Fault {
    /// String representation used in logs and status surfaces.
    pub fn as_str(self) -> &'static str {
        match self {
            Fault::ConnectFailure => "CONNECT_FAILURE",
            Fault::ChannelError => "CHANNEL_ERROR",
            Fault::MalformedPayload => "MALFORMED_PAYLOAD",
            Fault::RegistrationPrecondition => "REGISTRATION_PRECONDITION",
            Fault::RetriesExhausted => "RETRIES_EXHAUSTED",
            Fault::Config => "CONFIG",
            Fault::Internal => "INTERNAL",
        }
    }

    /// Whether this fault is surfaced to the user.
    ///
    /// Everything else is handled internally: connect failures are retried,
    /// malformed payloads are dropped, channel faults feed the retry path.
    pub fn is_user_visible(self) -> bool {
        matches!(
            self,
            Fault::RetriesExhausted | Fault::RegistrationPrecondition | Fault::Config
        )
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, PaddockError>;

/// Unified error type used across core and client.
#[derive(Debug, Error)]
pub enum PaddockError {
    #[error("connect failed: {0}")]
    ConnectFailure(String),
    #[error("channel error: {0}")]
    ChannelError(String),
    #[error("malformed payload: {0}")]
    MalformedPayload(String),
    #[error("registration precondition: {0}")]
    RegistrationPrecondition(String),
    #[error("retries exhausted after {0} attempts")]
    RetriesExhausted(u32),
    #[error("config: {0}")]
    Config(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl PaddockError {
    /// Map to a stable fault code.
    pub fn fault(&self) -> Fault {
        match self {
            PaddockError::ConnectFailure(_) => Fault::ConnectFailure,
            PaddockError::ChannelError(_) => Fault::ChannelError,
            PaddockError::MalformedPayload(_) => Fault::MalformedPayload,
            PaddockError::RegistrationPrecondition(_) => Fault::RegistrationPrecondition,
            PaddockError::RetriesExhausted(_) => Fault::RetriesExhausted,
            PaddockError::Config(_) => Fault::Config,
            PaddockError::Internal(_) => Fault::Internal,
        }
    }
}
