// ── Domain model ──

pub mod device;
pub mod telemetry;

pub use device::Device;
pub use telemetry::{TREND_UNKNOWN, TelemetrySample};

// Transport addressing types are the foundation of the domain model;
// re-exported so consumers rarely need `wristlink_transport` directly.
pub use wristlink_transport::{AppEndpoint, ConnectivityEvent, ConnectivityState, DeviceId};
