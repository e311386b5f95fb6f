// ── Device domain type ──

use serde::{Deserialize, Serialize};
use std::fmt;

use wristlink_transport::DeviceId;

/// A companion device as reported by the pairing handshake.
///
/// Immutable once discovered — a new handshake result replaces the
/// whole known set, it never merges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    /// User-facing name ("Forerunner 955" as the owner renamed it).
    pub name: String,
    /// Vendor model name.
    pub model: String,
}

impl Device {
    pub fn new(id: DeviceId, name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            model: model.into(),
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.model, self.id)
    }
}
