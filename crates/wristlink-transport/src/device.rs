// ── Transport addressing types ──
//
// DeviceId and AppEndpoint are the transport's addressing units; the
// core crate builds its domain model on top of them. ConnectivityState
// is transient per-device reachability as reported by the transport's
// own discovery/heartbeat — it is never persisted.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ── DeviceId ────────────────────────────────────────────────────────

/// Stable, opaque identifier for a companion device.
///
/// Assigned by the vendor SDK during the pairing handshake and stable
/// across restarts, which is what makes the persisted active selection
/// restorable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(Uuid);

impl DeviceId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DeviceId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl From<Uuid> for DeviceId {
    fn from(u: Uuid) -> Self {
        Self(u)
    }
}

// ── AppEndpoint ─────────────────────────────────────────────────────

/// The addressable target of a message: a companion application
/// instance on a specific device.
///
/// `app_id` is the build-time-known companion app identifier;
/// `instance_id` is minted fresh every time a device is armed, so two
/// activations of the same device never share an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppEndpoint {
    pub device_id: DeviceId,
    pub app_id: Uuid,
    pub instance_id: Uuid,
}

impl AppEndpoint {
    /// Build an endpoint for `device_id` with a fresh instance id.
    pub fn new(device_id: DeviceId, app_id: Uuid) -> Self {
        Self {
            device_id,
            app_id,
            instance_id: Uuid::new_v4(),
        }
    }
}

// ── Connectivity ────────────────────────────────────────────────────

/// Per-device reachability as last reported by the transport.
///
/// There is no polling API: absence of an event means `Unknown`, not
/// `NotConnected`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectivityState {
    #[default]
    Unknown,
    InvalidDevice,
    TransportUnavailable,
    NotFound,
    NotConnected,
    Connected,
}

impl ConnectivityState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::InvalidDevice => "invalid-device",
            Self::TransportUnavailable => "transport-unavailable",
            Self::NotFound => "not-found",
            Self::NotConnected => "not-connected",
            Self::Connected => "connected",
        };
        f.write_str(s)
    }
}

/// A reachability transition for a registered device.
///
/// Emitted zero or more times per registered device, at intervals the
/// transport alone decides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectivityEvent {
    pub device_id: DeviceId,
    pub state: ConnectivityState,
}
