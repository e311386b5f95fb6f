// ── Device registry ──
//
// The set of companion devices known from the most recent pairing
// handshake. Replaced wholesale, never merged. Mutations are broadcast
// to subscribers (the session layer and the settings UI) via a `watch`
// snapshot channel.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use wristlink_transport::DeviceId;

use crate::model::Device;
use crate::store::DeviceStore;
use crate::stream::DevicesStream;

/// Known-device set with persistence and change notification.
pub struct DeviceRegistry {
    store: DeviceStore,
    snapshot: watch::Sender<Arc<Vec<Arc<Device>>>>,
}

impl DeviceRegistry {
    pub fn new(store: DeviceStore) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self { store, snapshot }
    }

    /// Atomically replace the known set with a fresh handshake result.
    ///
    /// An empty result means "nothing new," not "clear everything": the
    /// prior set is kept and `false` is returned. Every successful
    /// replacement is persisted (write failure logged, non-fatal) and
    /// pushed to subscribers.
    pub fn replace_all(&self, devices: Vec<Device>) -> bool {
        if devices.is_empty() {
            warn!("handshake returned no devices, keeping prior set");
            return false;
        }

        info!(count = devices.len(), "replacing known device set");
        let devices: Vec<Arc<Device>> = devices.into_iter().map(Arc::new).collect();

        if let Err(e) = self.store.save(&devices) {
            warn!(error = %e, "failed to persist device set");
        }

        self.snapshot.send_modify(|snap| *snap = Arc::new(devices));
        true
    }

    /// Load the persisted set. Missing or corrupt store yields an
    /// empty set and never propagates an error.
    pub fn restore(&self) {
        match self.store.load() {
            Ok(devices) => {
                debug!(count = devices.len(), "restored known device set");
                let devices: Vec<Arc<Device>> = devices.into_iter().map(Arc::new).collect();
                self.snapshot.send_modify(|snap| *snap = Arc::new(devices));
            }
            Err(e) => warn!(error = %e, "failed to restore device set, starting empty"),
        }
    }

    /// Look up a device by identifier.
    pub fn find(&self, id: DeviceId) -> Option<Arc<Device>> {
        self.snapshot
            .borrow()
            .iter()
            .find(|d| d.id == id)
            .map(Arc::clone)
    }

    /// Current snapshot (cheap `Arc` clone).
    pub fn snapshot(&self) -> Arc<Vec<Arc<Device>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to device-set changes.
    pub fn subscribe(&self) -> DevicesStream {
        DevicesStream::new(self.snapshot.subscribe())
    }

    pub fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.borrow().is_empty()
    }
}
