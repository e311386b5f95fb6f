#![allow(clippy::unwrap_used)]
// End-to-end session tests against the LoopbackTransport: activation
// exclusivity, persisted-selection restore, the freshness gate in
// front of the dispatcher, the reconnect reactor, and the deferred
// proactive push.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use futures_util::future::BoxFuture;
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use wristlink_core::{
    ActiveDeviceSession, ConnectivityTracker, CoreError, Device, DeviceId, DeviceRegistry,
    DeviceStore, MessageDispatcher, SelectionStore, ServiceConfig, SessionReactor,
    TREND_UNKNOWN, TelemetrySample, TelemetrySource,
};
use wristlink_transport::{ConnectivityState, LoopbackTransport, Transport, WireMessage};

// A deferred-push delay long enough to never fire during a test.
const NEVER: Duration = Duration::from_secs(3600);

// ── Stub telemetry source ───────────────────────────────────────────

struct StubSource {
    samples: Mutex<Vec<TelemetrySample>>,
}

impl StubSource {
    fn empty() -> Arc<Self> {
        Arc::new(Self {
            samples: Mutex::new(Vec::new()),
        })
    }

    fn set(&self, samples: Vec<TelemetrySample>) {
        *self.samples.lock().unwrap() = samples;
    }
}

impl TelemetrySource for StubSource {
    fn query_most_recent(
        &self,
        limit: usize,
    ) -> BoxFuture<'_, Result<Vec<TelemetrySample>, CoreError>> {
        let out: Vec<TelemetrySample> =
            self.samples.lock().unwrap().iter().take(limit).copied().collect();
        Box::pin(async move { Ok(out) })
    }
}

// ── Harness ─────────────────────────────────────────────────────────

struct Harness {
    transport: Arc<LoopbackTransport>,
    registry: Arc<DeviceRegistry>,
    tracker: ConnectivityTracker,
    session: ActiveDeviceSession,
    source: Arc<StubSource>,
    app_id: Uuid,
    cancel: CancellationToken,
}

impl Harness {
    /// Build a full stack on `dir`. Must run inside a tokio runtime.
    fn new(dir: &Path, push_delay: Duration) -> Self {
        let transport = Arc::new(LoopbackTransport::new());
        let source = StubSource::empty();
        let app_id = Uuid::new_v4();

        let mut config = ServiceConfig::new(app_id, dir);
        config.push_delay = push_delay;

        let registry = Arc::new(DeviceRegistry::new(DeviceStore::new(
            config.device_store.clone(),
        )));
        let tracker =
            ConnectivityTracker::new(Arc::clone(&transport) as Arc<dyn Transport>);
        let cancel = CancellationToken::new();
        let _ = tracker.start(cancel.child_token());

        let dispatcher =
            MessageDispatcher::new(Arc::clone(&transport) as Arc<dyn Transport>);
        let session = ActiveDeviceSession::new(
            config,
            Arc::clone(&registry),
            tracker.clone(),
            dispatcher,
            Arc::clone(&source) as Arc<dyn TelemetrySource>,
            cancel.child_token(),
        );

        Self {
            transport,
            registry,
            tracker,
            session,
            source,
            app_id,
            cancel,
        }
    }

    fn spawn_reactor(&self) {
        let _ = SessionReactor::spawn(
            self.session.clone(),
            &self.tracker,
            self.cancel.child_token(),
        );
    }

    async fn wait_for_sends(&self, count: usize) {
        for _ in 0..200 {
            if self.transport.sent().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!(
            "timed out waiting for {count} sends, saw {}",
            self.transport.sent().len()
        );
    }
}

fn device(name: &str) -> Device {
    Device::new(DeviceId::new(Uuid::new_v4()), name, "forerunner-955")
}

fn sample_aged(value: f64, age: chrono::Duration) -> TelemetrySample {
    TelemetrySample::new(value, TREND_UNKNOWN, Utc::now() - age)
}

// ── Activation / registration exclusivity ───────────────────────────

#[tokio::test]
async fn reselecting_devices_leaves_exactly_one_registered() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(dir.path(), NEVER);
    let (a, b) = (device("watch-a"), device("watch-b"));
    h.registry.replace_all(vec![a.clone(), b.clone()]);

    h.session.set_active(Some(a.clone())).await;
    assert!(h.transport.is_registered(a.id));

    h.session.set_active(Some(b.clone())).await;
    assert_eq!(h.transport.registered_count(), 1);
    assert!(h.transport.is_registered(b.id));
    assert!(!h.transport.is_registered(a.id));
    assert_eq!(h.session.active_device_id(), Some(b.id));
}

#[tokio::test]
async fn clearing_deregisters_and_erases_the_persisted_id() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(dir.path(), NEVER);
    let a = device("watch-a");
    h.registry.replace_all(vec![a.clone()]);

    h.session.set_active(Some(a)).await;
    h.session.set_active(None).await;

    assert_eq!(h.transport.registered_count(), 0);
    assert_eq!(h.session.current(), None);

    // A fresh stack on the same directory restores nothing.
    let fresh = Harness::new(dir.path(), NEVER);
    fresh.registry.restore();
    fresh.session.restore().await;
    assert_eq!(fresh.session.current(), None);
    assert_eq!(fresh.transport.registered_count(), 0);
}

// ── Persisted selection restore ─────────────────────────────────────

#[tokio::test]
async fn restore_rearms_the_persisted_device() {
    let dir = tempfile::tempdir().unwrap();
    let a = device("watch-a");

    {
        let h = Harness::new(dir.path(), NEVER);
        h.registry
            .replace_all(vec![a.clone(), device("watch-b")]);
        h.session.set_active(Some(a.clone())).await;
    }

    let h = Harness::new(dir.path(), NEVER);
    h.registry.restore();
    h.session.restore().await;

    let selection = h.session.current().unwrap();
    assert_eq!(selection.device.id, a.id);
    assert_eq!(selection.endpoint.app_id, h.app_id);
    assert!(h.transport.is_registered(a.id));
}

#[tokio::test]
async fn restore_leaves_unknown_persisted_id_unset() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(dir.path(), NEVER);
    h.registry.replace_all(vec![device("watch-a")]);

    // A stale id from a device the handshake no longer reports.
    SelectionStore::new(dir.path().join("active_device.json"))
        .save(DeviceId::new(Uuid::new_v4()))
        .unwrap();

    h.session.restore().await;
    assert_eq!(h.session.current(), None);
    assert_eq!(h.transport.registered_count(), 0);
}

// ── Gate → dispatcher flow ──────────────────────────────────────────

#[tokio::test]
async fn fresh_sample_is_sent_to_the_active_endpoint() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(dir.path(), NEVER);
    let a = device("watch-a");
    h.registry.replace_all(vec![a.clone(), device("watch-b")]);
    h.session.set_active(Some(a.clone())).await;

    let sample = sample_aged(111.0, chrono::Duration::minutes(2));
    h.session.handle_samples(&[sample]).await;

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].message,
        WireMessage {
            metric: 111.0,
            trend: -1,
            timestamp: sample.captured_at.timestamp(),
        }
    );
    assert_eq!(sent[0].endpoint.device_id, a.id);
    assert_eq!(sent[0].endpoint.app_id, h.app_id);
}

#[tokio::test]
async fn stale_sample_never_reaches_the_transport() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(dir.path(), NEVER);
    let a = device("watch-a");
    h.registry.replace_all(vec![a.clone()]);
    h.session.set_active(Some(a)).await;

    // Default freshness bound is 10 minutes.
    h.session
        .handle_samples(&[sample_aged(111.0, chrono::Duration::minutes(15))])
        .await;

    assert!(h.transport.sent().is_empty());
}

#[tokio::test]
async fn fresh_sample_without_an_active_device_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(dir.path(), NEVER);

    h.session
        .handle_samples(&[sample_aged(111.0, chrono::Duration::minutes(2))])
        .await;

    assert!(h.transport.sent().is_empty());
}

// ── Reconnect reactor ───────────────────────────────────────────────

#[tokio::test]
async fn reactor_repushes_when_the_active_device_connects() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(dir.path(), NEVER);
    h.spawn_reactor();

    let a = device("watch-a");
    h.registry.replace_all(vec![a.clone()]);
    h.session.set_active(Some(a.clone())).await;
    h.source
        .set(vec![sample_aged(98.0, chrono::Duration::minutes(1))]);

    h.transport.emit(a.id, ConnectivityState::Connected);
    h.wait_for_sends(1).await;

    let sent = h.transport.sent();
    assert_eq!(sent[0].endpoint.device_id, a.id);
    assert_eq!(sent[0].message.metric, 98.0);
}

#[tokio::test]
async fn reactor_ignores_connects_of_non_active_devices() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(dir.path(), NEVER);
    h.spawn_reactor();

    let (a, b) = (device("watch-a"), device("watch-b"));
    h.registry.replace_all(vec![a.clone(), b.clone()]);
    h.session.set_active(Some(a)).await;
    h.source
        .set(vec![sample_aged(98.0, chrono::Duration::minutes(1))]);

    // Track b independently so its events pass the registration gate.
    h.tracker.register(b.id);
    h.transport.emit(b.id, ConnectivityState::Connected);

    // Give the reactor ample opportunity to misbehave.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(h.transport.sent().is_empty());
}

// ── Deferred proactive push ─────────────────────────────────────────

#[tokio::test]
async fn deferred_push_sends_to_the_device_still_active_at_fire_time() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(dir.path(), Duration::from_millis(50));
    let a = device("watch-a");
    h.registry.replace_all(vec![a.clone()]);
    h.source
        .set(vec![sample_aged(105.0, chrono::Duration::minutes(1))]);

    h.session.set_active(Some(a.clone())).await;
    h.wait_for_sends(1).await;

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].endpoint.device_id, a.id);
    assert_eq!(sent[0].message.metric, 105.0);
}

#[tokio::test]
async fn deferred_push_after_deactivation_sends_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(dir.path(), Duration::from_millis(50));
    let a = device("watch-a");
    h.registry.replace_all(vec![a.clone()]);
    h.source
        .set(vec![sample_aged(105.0, chrono::Duration::minutes(1))]);

    h.session.set_active(Some(a)).await;
    h.session.set_active(None).await;

    // Let both scheduled pushes fire against the cleared state.
    tokio::time::sleep(Duration::from_millis(250)).await;
    assert!(h.transport.sent().is_empty());
}
