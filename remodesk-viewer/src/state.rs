//! State shared between the receiver thread and the render loop.
//!
//! Four small pieces, each behind its own primitive: the latest-frame
//! cell (mutex), the screen-size triple (mutex, reconciled once per
//! render tick), the frame/byte counters (atomics), and the command
//! write handle (mutex around the socket clone).

use std::io::Write;
use std::net::TcpStream;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use remodesk_core::{InputCommand, RemoError, ScreenSize, encode_command};

// ── LatestFrame ──────────────────────────────────────────────────

/// Single-slot latest-frame-wins buffer.
///
/// The receiver overwrites any undelivered frame; the render loop
/// always draws the freshest one and never sees frames that were
/// superseded before a tick came around. Bounded memory by
/// construction.
#[derive(Default)]
pub struct LatestFrame(Mutex<Option<Vec<u8>>>);

impl LatestFrame {
    /// Replace the slot with a newer frame.
    pub fn store(&self, frame: Vec<u8>) {
        *self.0.lock().unwrap() = Some(frame);
    }

    /// Copy of the current frame, if any. The slot keeps it so the
    /// render loop can redraw between arrivals.
    pub fn snapshot(&self) -> Option<Vec<u8>> {
        self.0.lock().unwrap().clone()
    }

    /// Drop whatever is buffered (called on reconnect).
    pub fn clear(&self) {
        *self.0.lock().unwrap() = None;
    }
}

// ── Counters ─────────────────────────────────────────────────────

/// Frames/bytes received since the last report or (re)connect.
#[derive(Default)]
pub struct Counters {
    frames: AtomicU64,
    bytes: AtomicU64,
}

impl Counters {
    pub fn record(&self, payload_len: usize) {
        self.frames.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(payload_len as u64, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.frames.store(0, Ordering::Relaxed);
        self.bytes.store(0, Ordering::Relaxed);
    }

    /// `(frames, bytes)` accumulated so far.
    pub fn snapshot(&self) -> (u64, u64) {
        (
            self.frames.load(Ordering::Relaxed),
            self.bytes.load(Ordering::Relaxed),
        )
    }
}

// ── SizeState ────────────────────────────────────────────────────

/// The screen-size triple.
///
/// `negotiated` is written by the read thread from frame headers;
/// `current` is the size the render surface actually realized;
/// `requested` is the viewport after a local resize. All three may
/// transiently differ — the render loop reconciles once per tick, and
/// one stale tick is harmless.
pub struct SizeState {
    inner: Mutex<Sizes>,
}

#[derive(Clone, Copy)]
struct Sizes {
    current: ScreenSize,
    negotiated: ScreenSize,
    requested: ScreenSize,
}

impl SizeState {
    pub fn new(initial: ScreenSize) -> Self {
        Self {
            inner: Mutex::new(Sizes {
                current: initial,
                negotiated: initial,
                requested: initial,
            }),
        }
    }

    /// Read-thread side: a frame header declared this resolution.
    pub fn note_negotiated(&self, size: ScreenSize) {
        self.inner.lock().unwrap().negotiated = size;
    }

    /// Render-loop side: the local viewport changed.
    pub fn note_requested(&self, size: ScreenSize) {
        self.inner.lock().unwrap().requested = size;
    }

    /// The stream resolution to adopt, if it differs from the realized
    /// surface size.
    pub fn pending_adopt(&self) -> Option<ScreenSize> {
        let sizes = *self.inner.lock().unwrap();
        (sizes.negotiated != sizes.current).then_some(sizes.negotiated)
    }

    /// The surface was recreated at `size`; all three agree again.
    pub fn adopt(&self, size: ScreenSize) {
        let mut sizes = self.inner.lock().unwrap();
        sizes.current = size;
        sizes.requested = size;
        sizes.negotiated = size;
    }

    pub fn current(&self) -> ScreenSize {
        self.inner.lock().unwrap().current
    }

    pub fn requested(&self) -> ScreenSize {
        self.inner.lock().unwrap().requested
    }
}

// ── WriteHandle ──────────────────────────────────────────────────

/// The command channel's write half, shared with the render loop.
///
/// The receiver installs a socket clone on connect and clears it on
/// reconnect; send failures clear it too and the read loop discovers
/// the dead link on its own.
#[derive(Default)]
pub struct WriteHandle(Mutex<Option<TcpStream>>);

impl WriteHandle {
    pub fn install(&self, stream: TcpStream) {
        *self.0.lock().unwrap() = Some(stream);
    }

    pub fn clear(&self) {
        *self.0.lock().unwrap() = None;
    }

    /// Send one command; a no-op while disconnected.
    pub fn send(&self, cmd: &InputCommand) -> Result<(), RemoError> {
        let mut guard = self.0.lock().unwrap();
        if let Some(stream) = guard.as_mut() {
            let wire = encode_command(cmd)?;
            if let Err(e) = stream.write_all(&wire) {
                *guard = None;
                return Err(e.into());
            }
        }
        Ok(())
    }
}

// ── ViewerShared ─────────────────────────────────────────────────

/// Everything the receiver thread and the render loop share.
pub struct ViewerShared {
    pub cell: LatestFrame,
    pub counters: Counters,
    pub sizes: SizeState,
    pub link: WriteHandle,
    running: AtomicBool,
    status: Mutex<String>,
}

impl ViewerShared {
    pub fn new(initial: ScreenSize) -> Self {
        Self {
            cell: LatestFrame::default(),
            counters: Counters::default(),
            sizes: SizeState::new(initial),
            link: WriteHandle::default(),
            running: AtomicBool::new(true),
            status: Mutex::new("connecting".into()),
        }
    }

    pub fn running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Connection status line shown in the window title.
    pub fn set_status(&self, status: impl Into<String>) {
        *self.status.lock().unwrap() = status.into();
    }

    pub fn status(&self) -> String {
        self.status.lock().unwrap().clone()
    }
}

// ── Tests ────────────────────────────────────────────────────────
