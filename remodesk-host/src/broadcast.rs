//! Broadcaster — drains the frame queue and fans out to every viewer.
//!
//! Writes are sequential across viewers within one drain cycle, so a
//! slow viewer delays the others for that frame; eviction is
//! independent per viewer — one failed socket never affects the rest.
//! When the viewer set empties, the session falls back to standby:
//! the broadcaster stops, and dropping the queue receiver is what
//! stops the producer.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use remodesk_core::FrameReceiver;

use crate::session::{SessionState, SharedSessionState, SharedViewers};

/// Run the fan-out loop until the session goes standby.
pub async fn run(
    mut queue: FrameReceiver,
    viewers: SharedViewers,
    state: SharedSessionState,
    producer_running: Arc<AtomicBool>,
) {
    loop {
        let Some(frame) = queue.get().await else {
            // Producer died (capture/encode failure). Standby until the
            // next connection restarts the pipeline.
            let _set = viewers.lock().await;
            info!("frame queue drained; session standby");
            standby(&state, &producer_running);
            return;
        };
        let wire = frame.to_bytes();
        debug!(
            "broadcasting {} bytes at {}x{}",
            wire.len(),
            frame.header.width,
            frame.header.height
        );

        let mut set = viewers.lock().await;
        let mut i = 0;
        while i < set.len() {
            match set[i].writer.write_all(&wire).await {
                Ok(()) => i += 1,
                Err(e) => {
                    let gone = set.remove(i);
                    warn!("evicting viewer {}: {e}", gone.addr);
                }
            }
        }

        if set.is_empty() {
            // Transition under the set lock: accepts serialize against
            // this, so a viewer registered concurrently either lands
            // before the emptiness check or observes Standby and
            // restarts the pipeline.
            info!("no viewers connected; session standby");
            standby(&state, &producer_running);
            return;
        }
    }
}

/// Flip the session to standby and stop the producer. Returning from
/// [`run`] then drops the queue receiver, so the producer's next put
/// fails with `ChannelClosed` and the capture thread exits.
fn standby(state: &SharedSessionState, producer_running: &AtomicBool) {
    state.store(SessionState::Standby);
    producer_running.store(false, Ordering::SeqCst);
}
