// ── Telemetry sample ──

use chrono::{DateTime, Utc};

use wristlink_transport::WireMessage;

/// Trend code meaning "unknown or absent."
pub const TREND_UNKNOWN: i32 = -1;

/// One timestamped health-metric reading from the external source.
///
/// Produced externally and immutable; the coordinator only ever picks
/// the most recent one and turns it into a [`WireMessage`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    pub value: f64,
    /// Small vendor trend code; [`TREND_UNKNOWN`] when absent.
    pub trend: i32,
    pub captured_at: DateTime<Utc>,
}

impl TelemetrySample {
    pub fn new(value: f64, trend: i32, captured_at: DateTime<Utc>) -> Self {
        Self {
            value,
            trend,
            captured_at,
        }
    }
}

impl From<&TelemetrySample> for WireMessage {
    fn from(sample: &TelemetrySample) -> Self {
        Self {
            metric: sample.value,
            trend: sample.trend,
            timestamp: sample.captured_at.timestamp(),
        }
    }
}
