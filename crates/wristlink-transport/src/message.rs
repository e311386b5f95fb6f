// ── Wire message and send lifecycle types ──
//
// WireMessage is the only payload this subsystem ever puts on the air.
// It is a fixed struct, not a string-keyed map: the key set (`metric`,
// `trend`, `timestamp`) is the contract the coordinator guarantees to
// produce, and the type system should hold it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single outbound telemetry message.
///
/// Constructed per send from the most recent admitted sample, never
/// persisted. `timestamp` is epoch seconds of the sample's capture
/// time, `trend` is a small vendor trend code with `-1` meaning
/// unknown/absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub metric: f64,
    pub trend: i32,
    pub timestamp: i64,
}

/// One progress update for an in-flight send: bytes on the wire so far.
///
/// The transport emits zero or more of these before the terminal
/// [`SendOutcome`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendProgress {
    pub sent_bytes: u64,
    pub total_bytes: u64,
}

/// Terminal result of a send, reported exactly once.
///
/// These are data, not errors: the coordinator logs them and moves on.
/// The next telemetry event or connectivity reconnect is the de facto
/// retry mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Success,
    DeviceNotAvailable,
    SendInProgress,
    InvalidDevice,
    UnknownFailure,
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for SendOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::DeviceNotAvailable => "device-not-available",
            Self::SendInProgress => "send-in-progress",
            Self::InvalidDevice => "invalid-device",
            Self::UnknownFailure => "unknown-failure",
        };
        f.write_str(s)
    }
}
