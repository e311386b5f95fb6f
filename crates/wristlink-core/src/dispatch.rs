// ── Message dispatcher ──
//
// Serializes an admitted sample into the wire shape and issues the
// fire-and-forget transport send. A drain task logs progress and the
// terminal outcome; no retry, no state mutation — a completion landing
// after deactivation is logged and discarded.

use std::sync::Arc;

use tracing::{debug, info, warn};

use wristlink_transport::{AppEndpoint, DeviceId, SendTicket, Transport, WireMessage};

use crate::model::TelemetrySample;

/// Turns telemetry samples into outbound messages.
#[derive(Clone)]
pub struct MessageDispatcher {
    transport: Arc<dyn Transport>,
}

impl MessageDispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Send `sample` to `target`, returning as soon as the transfer has
    /// been issued.
    ///
    /// A `None` target is an expected, non-exceptional state (no active
    /// device): logged and skipped.
    pub fn send(&self, sample: &TelemetrySample, target: Option<&AppEndpoint>) {
        let Some(endpoint) = target else {
            debug!("no active device, skipping message");
            return;
        };

        let message = WireMessage::from(sample);
        info!(
            device_id = %endpoint.device_id,
            metric = message.metric,
            trend = message.trend,
            timestamp = message.timestamp,
            "sending telemetry message"
        );

        let ticket = self.transport.send_message(message, endpoint);
        tokio::spawn(drain_ticket(endpoint.device_id, ticket));
    }
}

/// Log the send lifecycle to completion. Every outcome is terminal and
/// self-contained.
async fn drain_ticket(device_id: DeviceId, mut ticket: SendTicket) {
    while let Some(progress) = ticket.progress.recv().await {
        debug!(
            %device_id,
            sent_bytes = progress.sent_bytes,
            total_bytes = progress.total_bytes,
            "send progress"
        );
    }

    match ticket.completion.await {
        Ok(outcome) if outcome.is_success() => {
            info!(%device_id, "message handed to transport");
        }
        Ok(outcome) => {
            warn!(%device_id, %outcome, "send failed; next sample or reconnect retries");
        }
        Err(_) => {
            warn!(%device_id, "transport dropped the send without an outcome");
        }
    }
}
