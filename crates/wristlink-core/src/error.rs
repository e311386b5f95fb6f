// ── Core error types ──
//
// Almost nothing in this subsystem propagates errors across async
// boundaries: transport outcomes are data, persistence failures
// degrade to "nothing restored / nothing persisted," and consistency
// problems are warnings. What remains here is the small set of
// conditions a caller can actually act on.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Setup-time misconfiguration. Surfaced once, blocks activation.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Durable store read/write failure. Callers log and degrade.
    #[error("Persistence failed at {path}: {reason}")]
    Persistence { path: PathBuf, reason: String },

    /// The telemetry source could not produce samples.
    #[error("Telemetry source unavailable: {reason}")]
    TelemetryUnavailable { reason: String },
}

impl CoreError {
    pub(crate) fn persistence(path: &Path, reason: impl ToString) -> Self {
        Self::Persistence {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
