// ── Telemetry freshness gate ──
//
// Selects the most recent sample from a batch and decides whether it
// is still worth transmitting. Pure aside from logging.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::model::TelemetrySample;

/// Most-recent-wins selection with a freshness bound.
#[derive(Debug, Clone)]
pub struct TelemetryGate {
    max_age: Duration,
}

impl TelemetryGate {
    /// Samples older than `max_age` are suppressed.
    pub fn new(max_age: std::time::Duration) -> Self {
        // An unrepresentable bound degenerates to "always fresh".
        let max_age = Duration::from_std(max_age).unwrap_or(Duration::MAX);
        Self { max_age }
    }

    /// The sample with the latest capture time, if it is fresh enough.
    pub fn admit<'a>(&self, samples: &'a [TelemetrySample]) -> Option<&'a TelemetrySample> {
        self.admit_at(samples, Utc::now())
    }

    /// [`admit`](Self::admit) against an explicit clock.
    pub fn admit_at<'a>(
        &self,
        samples: &'a [TelemetrySample],
        now: DateTime<Utc>,
    ) -> Option<&'a TelemetrySample> {
        let candidate = samples.iter().max_by_key(|s| s.captured_at)?;

        let age = now.signed_duration_since(candidate.captured_at);
        if age > self.max_age {
            warn!(
                age_secs = age.num_seconds(),
                max_age_secs = self.max_age.num_seconds(),
                "stale sample, not sending"
            );
            return None;
        }

        debug!(
            value = candidate.value,
            age_secs = age.num_seconds(),
            "admitting most recent sample"
        );
        Some(candidate)
    }
}
