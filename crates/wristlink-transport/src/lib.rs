//! Transport boundary between `wristlink-core` and the vendor
//! wearable-messaging SDK.
//!
//! This crate owns everything the core subsystem needs to know about
//! the wireless hop, and nothing else:
//!
//! - **Addressing** ([`device`]) — [`DeviceId`] (the transport's stable
//!   device identifier), [`AppEndpoint`] (a companion app instance on a
//!   specific device), and [`ConnectivityState`]/[`ConnectivityEvent`]
//!   as emitted by the transport's own discovery/heartbeat.
//!
//! - **Messages** ([`message`]) — the fixed [`WireMessage`] shape
//!   (`metric`, `trend`, `timestamp`), per-send [`SendProgress`]
//!   updates, and the terminal [`SendOutcome`] set.
//!
//! - **[`Transport`]** — the dyn-compatible seam a real SDK binding
//!   implements: fire-and-forget `send_message` returning a
//!   [`SendTicket`], plus device-event registration and a broadcast
//!   subscription for connectivity transitions.
//!
//! - **[`LoopbackTransport`]** — an in-process implementation that
//!   records sends and lets a harness inject connectivity transitions.
//!   Used by the core crate's integration tests and by demos.

pub mod device;
pub mod loopback;
pub mod message;
pub mod transport;

pub use device::{AppEndpoint, ConnectivityEvent, ConnectivityState, DeviceId};
pub use loopback::{LoopbackTransport, SentMessage};
pub use message::{SendOutcome, SendProgress, WireMessage};
pub use transport::{SendTicket, Transport};
