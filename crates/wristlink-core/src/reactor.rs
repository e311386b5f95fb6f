// ── Session reactor ──
//
// Recovers from "message attempted while the link was still
// establishing": whenever the active device transitions to Connected,
// re-push the latest known sample.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::connectivity::ConnectivityTracker;
use crate::session::ActiveDeviceSession;

/// Bridges connectivity transitions to proactive pushes.
pub struct SessionReactor;

impl SessionReactor {
    /// Spawn the reactor task. It runs until cancelled or the tracker
    /// is dropped.
    pub fn spawn(
        session: ActiveDeviceSession,
        tracker: &ConnectivityTracker,
        cancel: CancellationToken,
    ) -> JoinHandle<()> {
        let mut events = tracker.subscribe();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = events.recv() => match result {
                        Ok(event)
                            if event.state.is_connected()
                                && session.is_active(event.device_id) =>
                        {
                            info!(
                                device_id = %event.device_id,
                                "active device connected, re-pushing latest sample"
                            );
                            session.push_latest().await;
                        }
                        Ok(_) => {}
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(skipped = n, "reactor lagged behind connectivity events");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        })
    }
}
