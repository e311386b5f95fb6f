// ── Coordinator facade ──
//
// Wires the subsystem together once at process start and hands out
// component references — no global singletons. `new()` only validates
// and constructs; `start()` restores persisted state and spawns the
// background tasks; `shutdown()` cancels them and waits.

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use wristlink_transport::Transport;

use crate::config::ServiceConfig;
use crate::connectivity::ConnectivityTracker;
use crate::dispatch::MessageDispatcher;
use crate::error::CoreError;
use crate::reactor::SessionReactor;
use crate::registry::DeviceRegistry;
use crate::session::ActiveDeviceSession;
use crate::source::TelemetrySource;
use crate::store::DeviceStore;

/// The main entry point for hosts embedding the coordinator.
pub struct Coordinator {
    registry: Arc<DeviceRegistry>,
    tracker: ConnectivityTracker,
    session: ActiveDeviceSession,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Validate `config` and construct the subsystem. Does NOT spawn
    /// anything — call [`start()`](Self::start) from within a tokio
    /// runtime.
    pub fn new(
        config: ServiceConfig,
        transport: Arc<dyn Transport>,
        source: Arc<dyn TelemetrySource>,
    ) -> Result<Self, CoreError> {
        config.validate()?;

        let cancel = CancellationToken::new();
        let registry = Arc::new(DeviceRegistry::new(DeviceStore::new(
            config.device_store.clone(),
        )));
        let tracker = ConnectivityTracker::new(Arc::clone(&transport));
        let dispatcher = MessageDispatcher::new(transport);
        let session = ActiveDeviceSession::new(
            config,
            Arc::clone(&registry),
            tracker.clone(),
            dispatcher,
            source,
            cancel.child_token(),
        );

        Ok(Self {
            registry,
            tracker,
            session,
            cancel,
            task_handles: Mutex::new(Vec::new()),
        })
    }

    /// Spawn background tasks and restore persisted state: the known
    /// device set first, then the active selection (which is
    /// cross-checked against it).
    pub async fn start(&self) {
        let mut handles = self.task_handles.lock().await;
        handles.push(self.tracker.start(self.cancel.child_token()));
        handles.push(SessionReactor::spawn(
            self.session.clone(),
            &self.tracker,
            self.cancel.child_token(),
        ));
        drop(handles);

        self.registry.restore();
        self.session.restore().await;
        info!(known_devices = self.registry.len(), "coordinator started");
    }

    /// Cancel background tasks and wait for them to finish.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let mut handles = self.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("coordinator stopped");
    }

    pub fn registry(&self) -> &Arc<DeviceRegistry> {
        &self.registry
    }

    pub fn tracker(&self) -> &ConnectivityTracker {
        &self.tracker
    }

    pub fn session(&self) -> &ActiveDeviceSession {
        &self.session
    }
}
