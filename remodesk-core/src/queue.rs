//! Bounded frame queue between the capture producer and the broadcaster.
//!
//! The single point of synchronization between capture rate and send
//! rate: `put` blocks while the queue is at capacity, so the producer
//! is throttled by the slowest broadcast cycle rather than dropping
//! frames — back-pressure, not loss. Built on a bounded
//! `tokio::sync::mpsc` channel: the capture thread uses the blocking
//! send form, the broadcaster task awaits `get`.
//!
//! Queue closure (the receiver dropped) surfaces as
//! [`RemoError::ChannelClosed`] from `put`; that is the producer's
//! stop signal when the session falls back to standby.

use tokio::sync::mpsc;

use crate::error::RemoError;
use crate::frame::Frame;

/// Default queue capacity.
pub const FRAME_QUEUE_DEPTH: usize = 10;

/// Create a bounded frame queue of the given capacity.
pub fn frame_queue(capacity: usize) -> (FrameSender, FrameReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (FrameSender { tx }, FrameReceiver { rx })
}

// ── FrameSender ──────────────────────────────────────────────────

/// Producer half of the queue. Lives on the capture thread.
pub struct FrameSender {
    tx: mpsc::Sender<Frame>,
}

impl FrameSender {
    /// Insert a frame, blocking the calling thread while the queue is
    /// at capacity.
    ///
    /// Must be called from a plain thread, never from inside the async
    /// runtime.
    pub fn put(&self, frame: Frame) -> Result<(), RemoError> {
        self.tx.blocking_send(frame)?;
        Ok(())
    }
}

// ── FrameReceiver ────────────────────────────────────────────────

/// Consumer half of the queue. Owned by the broadcaster task.
pub struct FrameReceiver {
    rx: mpsc::Receiver<Frame>,
}

impl FrameReceiver {
    /// Take the next frame, waiting while the queue is empty.
    ///
    /// Returns `None` once the producer is gone and the queue drained.
    pub async fn get(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }
}

// ── Tests ────────────────────────────────────────────────────────
