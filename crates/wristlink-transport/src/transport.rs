// ── Transport trait ──
//
// The seam a vendor SDK binding implements. Kept dyn-compatible on
// purpose: the core crate holds an `Arc<dyn Transport>` and never
// names a concrete binding. Send completion travels over channels
// rather than callbacks — the SDK's progress/completion pair maps to
// an mpsc stream plus a oneshot.

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::device::{AppEndpoint, ConnectivityEvent, DeviceId};
use crate::message::{SendOutcome, SendProgress, WireMessage};

/// Handle for one in-flight send.
///
/// `progress` yields zero or more updates; `completion` resolves
/// exactly once with the terminal outcome. Dropping the ticket is
/// legal — the send itself is fire-and-forget.
pub struct SendTicket {
    pub progress: mpsc::Receiver<SendProgress>,
    pub completion: oneshot::Receiver<SendOutcome>,
}

/// The vendor messaging SDK surface this subsystem relies on.
///
/// All methods are non-blocking: `send_message` returns as soon as the
/// transfer has been issued, and connectivity events arrive on the
/// broadcast channel from the transport's own delivery context.
pub trait Transport: Send + Sync + 'static {
    /// Issue a fire-and-forget message transfer to `endpoint`.
    ///
    /// A device must be registered for device events before messages
    /// to it can succeed; the vendor SDK fails unregistered sends with
    /// [`SendOutcome::DeviceNotAvailable`].
    fn send_message(&self, message: WireMessage, endpoint: &AppEndpoint) -> SendTicket;

    /// Start delivering connectivity events for `device_id`. Idempotent.
    fn register(&self, device_id: DeviceId);

    /// Stop delivering connectivity events for `device_id`. Idempotent;
    /// does not cancel an in-flight send.
    fn unregister(&self, device_id: DeviceId);

    /// Drop every registration at once.
    fn unregister_all(&self);

    /// Subscribe to connectivity transitions for registered devices.
    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent>;
}
