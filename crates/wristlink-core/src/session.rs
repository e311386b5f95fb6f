// ── Active device session ──
//
// Owns the single (device, endpoint) pair messages are addressed to.
// Every mutation goes through one tokio Mutex — UI-driven selection
// changes, connectivity callbacks, and the deferred push timer all
// post into this owner instead of touching shared state directly. A
// `watch` mirror serves lock-free, eventually-consistent reads for
// display.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use wristlink_transport::{AppEndpoint, DeviceId};

use crate::config::ServiceConfig;
use crate::connectivity::ConnectivityTracker;
use crate::dispatch::MessageDispatcher;
use crate::gate::TelemetryGate;
use crate::model::{Device, TelemetrySample};
use crate::registry::DeviceRegistry;
use crate::source::TelemetrySource;
use crate::store::SelectionStore;

/// The currently armed target: a device plus its messaging endpoint.
///
/// The endpoint's instance id is minted at activation; only the device
/// id is persisted, the endpoint is reconstructed on restore.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSelection {
    pub device: Arc<Device>,
    pub endpoint: AppEndpoint,
}

/// Single-writer owner of the active selection.
///
/// Cheaply cloneable via `Arc<SessionInner>`.
#[derive(Clone)]
pub struct ActiveDeviceSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: ServiceConfig,
    registry: Arc<DeviceRegistry>,
    tracker: ConnectivityTracker,
    dispatcher: MessageDispatcher,
    source: Arc<dyn TelemetrySource>,
    gate: TelemetryGate,
    selection_store: SelectionStore,
    /// The single serialized entry point for every mutation.
    selection: Mutex<Option<ActiveSelection>>,
    /// Lock-free mirror of `selection` for display reads.
    current: watch::Sender<Option<ActiveSelection>>,
    /// Cancelled on shutdown; outstanding deferred pushes die with it.
    cancel: CancellationToken,
}

impl ActiveDeviceSession {
    pub fn new(
        config: ServiceConfig,
        registry: Arc<DeviceRegistry>,
        tracker: ConnectivityTracker,
        dispatcher: MessageDispatcher,
        source: Arc<dyn TelemetrySource>,
        cancel: CancellationToken,
    ) -> Self {
        let gate = TelemetryGate::new(config.max_sample_age);
        let selection_store = SelectionStore::new(config.selection_store.clone());
        let (current, _) = watch::channel(None);

        Self {
            inner: Arc::new(SessionInner {
                config,
                registry,
                tracker,
                dispatcher,
                source,
                gate,
                selection_store,
                selection: Mutex::new(None),
                current,
                cancel,
            }),
        }
    }

    /// Arm `device` as the message target, or clear the selection.
    ///
    /// The previous device (if any) is deregistered first, so at most
    /// one device is ever registered. The persisted identifier follows
    /// the selection: erased on every change, rewritten when arming.
    /// Either way a deferred proactive push is scheduled — the
    /// wireless link is often not up yet at call time.
    pub async fn set_active(&self, device: Option<Device>) {
        let mut selection = self.inner.selection.lock().await;

        if let Some(old) = selection.take() {
            info!(device_id = %old.device.id, "deregistering previously active device");
            self.inner.tracker.deregister(old.device.id);
        }
        if let Err(e) = self.inner.selection_store.clear() {
            warn!(error = %e, "failed to erase persisted selection");
        }

        if let Some(device) = device {
            if self.inner.registry.find(device.id).is_none() {
                // Permitted, but worth flagging: the registry and the
                // selection normally agree.
                warn!(device_id = %device.id, "activating a device the registry does not know");
            }

            let endpoint = AppEndpoint::new(device.id, self.inner.config.companion_app_id);
            info!(device_id = %device.id, device = %device, "activating companion device");

            if let Err(e) = self.inner.selection_store.save(device.id) {
                warn!(error = %e, "failed to persist active selection");
            }
            self.inner.tracker.register(device.id);

            *selection = Some(ActiveSelection {
                device: Arc::new(device),
                endpoint,
            });
        } else {
            info!("active device cleared");
        }

        self.inner.current.send_replace(selection.clone());
        drop(selection);

        self.schedule_deferred_push();
    }

    /// Restore the persisted selection at startup.
    ///
    /// The stored identifier is cross-checked against the registry; if
    /// the device is no longer known the selection stays empty.
    pub async fn restore(&self) {
        match self.inner.selection_store.load() {
            Ok(Some(id)) => match self.inner.registry.find(id) {
                Some(device) => {
                    info!(device_id = %id, "restoring persisted active device");
                    self.set_active(Some((*device).clone())).await;
                }
                None => {
                    info!(device_id = %id, "persisted device no longer known, leaving selection empty");
                }
            },
            Ok(None) => debug!("no persisted active device"),
            Err(e) => warn!(error = %e, "failed to read persisted selection"),
        }
    }

    /// Clear the selection and erase the persisted identifier. Called
    /// when the owning service is deleted.
    pub async fn clear(&self) {
        self.set_active(None).await;
    }

    /// Gate an externally observed sample batch and dispatch the
    /// winner to the current selection.
    pub async fn handle_samples(&self, samples: &[TelemetrySample]) {
        let Some(sample) = self.inner.gate.admit(samples) else {
            return;
        };

        // Dispatch under the selection lock: a send can never race a
        // concurrent deactivation and hit a just-cleared device.
        let selection = self.inner.selection.lock().await;
        self.inner
            .dispatcher
            .send(sample, selection.as_ref().map(|s| &s.endpoint));
    }

    /// Query the telemetry source and push the most recent admitted
    /// sample to whatever device is active once the query resolves.
    pub async fn push_latest(&self) {
        let limit = self.inner.config.telemetry_query_limit;
        match self.inner.source.query_most_recent(limit).await {
            Ok(samples) => self.handle_samples(&samples).await,
            Err(e) => warn!(error = %e, "telemetry query failed, nothing to push"),
        }
    }

    /// Eventually-consistent read of the active selection.
    pub fn current(&self) -> Option<ActiveSelection> {
        self.inner.current.borrow().clone()
    }

    /// Identifier of the active device, if any.
    pub fn active_device_id(&self) -> Option<DeviceId> {
        self.inner.current.borrow().as_ref().map(|s| s.device.id)
    }

    /// Whether `device_id` is the active device (display helper).
    pub fn is_active(&self, device_id: DeviceId) -> bool {
        self.active_device_id() == Some(device_id)
    }

    /// Subscribe to selection changes.
    pub fn watch(&self) -> watch::Receiver<Option<ActiveSelection>> {
        self.inner.current.subscribe()
    }

    /// Schedule the proactive push. The task re-reads the active
    /// selection when the delay elapses, so a push armed for a
    /// since-deactivated device observes the refreshed state and sends
    /// nothing.
    fn schedule_deferred_push(&self) {
        let session = self.clone();
        let delay = self.inner.config.push_delay;
        let cancel = self.inner.cancel.clone();

        tokio::spawn(async move {
            tokio::select! {
                () = cancel.cancelled() => {}
                () = tokio::time::sleep(delay) => {
                    debug!("deferred proactive push firing");
                    session.push_latest().await;
                }
            }
        });
    }
}
