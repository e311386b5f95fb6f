// ── Loopback transport ──
//
// In-process Transport implementation. Records every send and lets a
// harness inject connectivity transitions, honoring the same
// registration gate the vendor SDK applies: events for unregistered
// devices are dropped, and sends to unregistered devices complete
// with DeviceNotAvailable.

use dashmap::DashSet;
use parking_lot::Mutex;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, trace};

use crate::device::{AppEndpoint, ConnectivityEvent, ConnectivityState, DeviceId};
use crate::message::{SendOutcome, SendProgress, WireMessage};
use crate::transport::{SendTicket, Transport};

const EVENT_CHANNEL_SIZE: usize = 64;

/// One recorded send: the message plus where it was addressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentMessage {
    pub message: WireMessage,
    pub endpoint: AppEndpoint,
}

/// In-process [`Transport`] for tests and demos.
///
/// Sends complete immediately with a scripted outcome (default
/// [`SendOutcome::Success`]) after a single progress update covering
/// the full encoded payload.
pub struct LoopbackTransport {
    registered: DashSet<DeviceId>,
    sent: Mutex<Vec<SentMessage>>,
    outcome: Mutex<SendOutcome>,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            registered: DashSet::new(),
            sent: Mutex::new(Vec::new()),
            outcome: Mutex::new(SendOutcome::Success),
            events,
        }
    }

    /// Script the terminal outcome for subsequent registered sends.
    pub fn set_outcome(&self, outcome: SendOutcome) {
        *self.outcome.lock() = outcome;
    }

    /// Inject a connectivity transition, as the SDK's discovery would.
    ///
    /// Returns `false` when the device is not registered (the event is
    /// dropped, matching the SDK's registration gate) or nobody is
    /// subscribed.
    pub fn emit(&self, device_id: DeviceId, state: ConnectivityState) -> bool {
        if !self.registered.contains(&device_id) {
            trace!(%device_id, %state, "dropping event for unregistered device");
            return false;
        }
        self.events
            .send(ConnectivityEvent { device_id, state })
            .is_ok()
    }

    /// Everything sent so far, in order.
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().clone()
    }

    /// Whether `device_id` is currently registered for device events.
    pub fn is_registered(&self, device_id: DeviceId) -> bool {
        self.registered.contains(&device_id)
    }

    /// Number of currently registered devices.
    pub fn registered_count(&self) -> usize {
        self.registered.len()
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for LoopbackTransport {
    fn send_message(&self, message: WireMessage, endpoint: &AppEndpoint) -> SendTicket {
        let (progress_tx, progress) = mpsc::channel(4);
        let (completion_tx, completion) = oneshot::channel();

        let outcome = if self.registered.contains(&endpoint.device_id) {
            self.sent.lock().push(SentMessage {
                message,
                endpoint: *endpoint,
            });
            let total_bytes = serde_json::to_vec(&message).map_or(0, |b| b.len() as u64);
            let _ = progress_tx.try_send(SendProgress {
                sent_bytes: total_bytes,
                total_bytes,
            });
            *self.outcome.lock()
        } else {
            SendOutcome::DeviceNotAvailable
        };

        debug!(device_id = %endpoint.device_id, %outcome, "loopback send");
        let _ = completion_tx.send(outcome);

        SendTicket {
            progress,
            completion,
        }
    }

    fn register(&self, device_id: DeviceId) {
        if self.registered.insert(device_id) {
            debug!(%device_id, "registered for device events");
        }
    }

    fn unregister(&self, device_id: DeviceId) {
        if self.registered.remove(&device_id).is_some() {
            debug!(%device_id, "unregistered from device events");
        }
    }

    fn unregister_all(&self) {
        self.registered.clear();
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }
}
