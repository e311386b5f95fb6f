//! Companion-device session and telemetry-push coordination.
//!
//! This crate owns the stateful core between a health-data source and
//! the vendor wearable-messaging transport (`wristlink-transport`):
//!
//! - **[`DeviceRegistry`]** — the set of devices known from the most
//!   recent pairing handshake, persisted and replaced wholesale, with
//!   reactive change notification ([`DevicesStream`]).
//!
//! - **[`ActiveDeviceSession`]** — single-writer owner of the one
//!   active (device, endpoint) pair. Persists the selection across
//!   restarts and keeps the connectivity registration in lockstep with
//!   it: at most one device is ever registered.
//!
//! - **[`ConnectivityTracker`]** — maps registered devices to the
//!   reachability state last reported by the transport.
//!
//! - **[`TelemetryGate`]** — most-recent-wins sample selection with a
//!   freshness bound (default 10 minutes).
//!
//! - **[`MessageDispatcher`]** — serializes an admitted sample into
//!   the wire shape and issues the fire-and-forget send, logging
//!   progress and outcome. No retry: the next sample or reconnect is
//!   the retry mechanism.
//!
//! - **[`SessionReactor`]** — re-pushes the latest sample when the
//!   active device transitions to connected.
//!
//! - **[`Coordinator`]** — facade constructing all of the above once
//!   at process start with explicit dependency injection.

pub mod config;
pub mod connectivity;
pub mod coordinator;
pub mod dispatch;
pub mod error;
pub mod gate;
pub mod model;
pub mod reactor;
pub mod registry;
pub mod session;
pub mod source;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_MAX_SAMPLE_AGE, DEFAULT_PUSH_DELAY, ServiceConfig};
pub use connectivity::ConnectivityTracker;
pub use coordinator::Coordinator;
pub use dispatch::MessageDispatcher;
pub use error::CoreError;
pub use gate::TelemetryGate;
pub use model::{
    AppEndpoint, ConnectivityEvent, ConnectivityState, Device, DeviceId, TREND_UNKNOWN,
    TelemetrySample,
};
pub use reactor::SessionReactor;
pub use registry::DeviceRegistry;
pub use session::{ActiveDeviceSession, ActiveSelection};
pub use source::TelemetrySource;
pub use store::{DeviceStore, SelectionStore};
pub use stream::{DevicesStream, DevicesWatchStream};
