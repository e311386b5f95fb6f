// ── Durable stores ──
//
// Two tiny JSON files: the full known-device set and the single active
// device identifier. Reads on a missing file yield "nothing stored,"
// never an error — restore-on-fresh-install must be silent.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use wristlink_transport::DeviceId;

use crate::error::CoreError;
use crate::model::Device;

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| CoreError::persistence(path, e))?;
    }
    let json =
        serde_json::to_vec_pretty(value).map_err(|e| CoreError::persistence(path, e))?;
    std::fs::write(path, json).map_err(|e| CoreError::persistence(path, e))
}

// ── DeviceStore ─────────────────────────────────────────────────────

/// Serialized known-device set.
pub struct DeviceStore {
    path: PathBuf,
}

impl DeviceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, devices: &[Arc<Device>]) -> Result<(), CoreError> {
        write_json(&self.path, &devices)
    }

    /// Load the stored set. A missing file yields an empty set; a
    /// corrupt file is an error the caller logs and degrades from.
    pub fn load(&self) -> Result<Vec<Device>, CoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(CoreError::persistence(&self.path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| CoreError::persistence(&self.path, e))
    }
}

// ── SelectionStore ──────────────────────────────────────────────────

/// Persisted active-device identifier (or absence).
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn save(&self, id: DeviceId) -> Result<(), CoreError> {
        write_json(&self.path, &id)
    }

    pub fn load(&self) -> Result<Option<DeviceId>, CoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CoreError::persistence(&self.path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| CoreError::persistence(&self.path, e))
    }

    /// Erase the stored identifier. Erasing an absent one is a no-op.
    pub fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::persistence(&self.path, e)),
        }
    }
}
