// ── Connectivity tracker ──
//
// Maps registered device ids to the reachability state last reported
// by the transport. State entries exist exactly as long as the
// registration does; absence of an event means Unknown, never
// NotConnected. Events for unregistered devices are dropped on the
// floor — deregistering cancels future callbacks but not in-flight
// sends.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use wristlink_transport::{ConnectivityEvent, ConnectivityState, DeviceId, Transport};

const EVENT_CHANNEL_SIZE: usize = 64;

/// Tracks per-device connectivity for registered devices.
///
/// Cheaply cloneable via `Arc<TrackerInner>`.
#[derive(Clone)]
pub struct ConnectivityTracker {
    inner: Arc<TrackerInner>,
}

struct TrackerInner {
    transport: Arc<dyn Transport>,
    states: DashMap<DeviceId, ConnectivityState>,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl ConnectivityTracker {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        Self {
            inner: Arc::new(TrackerInner {
                transport,
                states: DashMap::new(),
                events,
            }),
        }
    }

    /// Spawn the event pump that applies transport events to the state
    /// map and re-broadcasts them to subscribers.
    pub fn start(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        let mut rx = inner.transport.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = rx.recv() => match result {
                        Ok(event) => inner.apply(event),
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "connectivity event pump lagged");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        })
    }

    /// Start tracking `device_id`. Registering an already-registered
    /// device is a no-op.
    pub fn register(&self, device_id: DeviceId) {
        if let Entry::Vacant(entry) = self.inner.states.entry(device_id) {
            entry.insert(ConnectivityState::Unknown);
            self.inner.transport.register(device_id);
            debug!(%device_id, "tracking connectivity");
        }
    }

    /// Stop tracking `device_id`. Deregistering an unregistered device
    /// is a no-op.
    pub fn deregister(&self, device_id: DeviceId) {
        if self.inner.states.remove(&device_id).is_some() {
            self.inner.transport.unregister(device_id);
            debug!(%device_id, "stopped tracking connectivity");
        }
    }

    /// Drop every registration at once.
    pub fn deregister_all(&self) {
        self.inner.states.clear();
        self.inner.transport.unregister_all();
    }

    /// Last reported state for `device_id`; `Unknown` when untracked
    /// or no event has arrived yet.
    pub fn state(&self, device_id: DeviceId) -> ConnectivityState {
        self.inner
            .states
            .get(&device_id)
            .map_or(ConnectivityState::Unknown, |s| *s)
    }

    pub fn is_registered(&self, device_id: DeviceId) -> bool {
        self.inner.states.contains_key(&device_id)
    }

    pub fn registered_count(&self) -> usize {
        self.inner.states.len()
    }

    /// Subscribe to connectivity transitions of tracked devices.
    pub fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.inner.events.subscribe()
    }
}

impl TrackerInner {
    fn apply(&self, event: ConnectivityEvent) {
        let Some(mut entry) = self.states.get_mut(&event.device_id) else {
            trace!(device_id = %event.device_id, "event for untracked device, dropped");
            return;
        };
        *entry = event.state;
        drop(entry);

        debug!(device_id = %event.device_id, state = %event.state, "connectivity changed");
        let _ = self.events.send(event);
    }
}
