// ── Service configuration ──
//
// Describes *how* the coordinator runs: which companion app to target,
// how long to hold the deferred proactive push, how fresh a sample
// must be to go on the air, and where the durable stores live. The
// host constructs a `ServiceConfig` and hands it in — core never
// resolves paths on its own.

use std::path::PathBuf;
use std::time::Duration;

use uuid::Uuid;

use crate::error::CoreError;

/// Delay between arming a device and the proactive re-push, giving the
/// wireless link time to come up.
pub const DEFAULT_PUSH_DELAY: Duration = Duration::from_secs(5);

/// Samples older than this are suppressed by the freshness gate.
pub const DEFAULT_MAX_SAMPLE_AGE: Duration = Duration::from_secs(10 * 60);

/// Configuration for a single coordinator instance.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// The build-time-known companion application identifier on the
    /// device. Required; a nil id blocks activation.
    pub companion_app_id: Uuid,
    /// Delay before the deferred proactive push fires.
    pub push_delay: Duration,
    /// Freshness bound for outbound samples.
    pub max_sample_age: Duration,
    /// How many samples to request from the telemetry source when
    /// proactively pushing (most-recent-first; only the newest is sent).
    pub telemetry_query_limit: usize,
    /// Path of the serialized known-device set.
    pub device_store: PathBuf,
    /// Path of the persisted active-device identifier.
    pub selection_store: PathBuf,
}

impl ServiceConfig {
    /// Build a config with default tuning, placing both stores under
    /// `data_dir`.
    pub fn new(companion_app_id: Uuid, data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            companion_app_id,
            push_delay: DEFAULT_PUSH_DELAY,
            max_sample_age: DEFAULT_MAX_SAMPLE_AGE,
            telemetry_query_limit: 1,
            device_store: data_dir.join("devices.json"),
            selection_store: data_dir.join("active_device.json"),
        }
    }

    /// Validate settings that would otherwise fail at first use.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.companion_app_id.is_nil() {
            return Err(CoreError::Config {
                message: "companion app id is not set".into(),
            });
        }
        if self.max_sample_age.is_zero() {
            return Err(CoreError::Config {
                message: "max sample age must be greater than zero".into(),
            });
        }
        if self.telemetry_query_limit == 0 {
            return Err(CoreError::Config {
                message: "telemetry query limit must be at least 1".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn valid_config_passes() {
        let config = ServiceConfig::new(Uuid::new_v4(), "/tmp/wristlink");
        config.validate().unwrap();
        assert_eq!(config.push_delay, DEFAULT_PUSH_DELAY);
        assert_eq!(config.max_sample_age, DEFAULT_MAX_SAMPLE_AGE);
    }

    #[test]
    fn nil_app_id_blocks_activation() {
        let config = ServiceConfig::new(Uuid::nil(), "/tmp/wristlink");
        assert!(matches!(
            config.validate(),
            Err(CoreError::Config { .. })
        ));
    }

    #[test]
    fn zero_max_age_is_rejected() {
        let mut config = ServiceConfig::new(Uuid::new_v4(), "/tmp/wristlink");
        config.max_sample_age = Duration::ZERO;
        assert!(matches!(config.validate(), Err(CoreError::Config { .. })));
    }
}
