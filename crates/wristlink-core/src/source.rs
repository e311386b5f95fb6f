// ── Telemetry source seam ──
//
// The health-data producer is a black box queried on demand. The
// proactive push paths (deferred timer, reconnect reactor) pull from
// it; externally observed batches enter through
// `ActiveDeviceSession::handle_samples` instead.

use futures_util::future::BoxFuture;

use crate::error::CoreError;
use crate::model::TelemetrySample;

/// On-demand access to the most recent telemetry samples.
pub trait TelemetrySource: Send + Sync + 'static {
    /// Up to `limit` samples, most-recent-first.
    fn query_most_recent(
        &self,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<TelemetrySample>, CoreError>>;
}
